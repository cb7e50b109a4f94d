mod reconcile_test;

use assertables::*;
use rstest::*;
use serde_json::json;
use tracing_test::traced_test;

use crate::errors::*;
use crate::prelude::*;
use crate::testutils::*;
