mod scenario_file_test;

use assertables::*;
use rstest::*;

use super::*;
