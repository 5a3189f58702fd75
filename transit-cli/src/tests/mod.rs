//! Shared test harness modules for the transit CLI.

use super::*;

mod helpers;
