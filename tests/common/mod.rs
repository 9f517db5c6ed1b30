// Not every suite uses every helper
#![allow(dead_code)]

pub mod wiremock_helpers;
