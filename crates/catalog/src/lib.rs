// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Product catalog parsing and definition

mod parser;
mod product;

pub use parser::{load_catalog, parse_catalog, ParseError};
pub use product::{Catalog, ProductDef};
