
use assertables::*;
use rstest::*;
use serde_json::{
    Value,
    json,
};

use super::*;
use crate::constants::*;
use crate::testutils::registry;
