mod client_test;

use std::sync::Arc;

use assertables::*;
use rstest::*;
use serde_json::{
    Value,
    json,
};
use tracing_test::traced_test;

use super::*;
use crate::constants::*;
use crate::schema::SchemaRegistry;
use crate::testutils::registry;
