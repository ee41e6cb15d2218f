//! Registration of the extensions that ship with Kacket.

use crate::extensions::cases::{self, parse_cases};
use crate::extensions::datatype::{self, parse_define_datatype};
use crate::extensions::ExtensionRegistry;

/// Registers `define-datatype` and `cases`.
pub fn register_std_extensions(registry: &mut ExtensionRegistry) {
    registry.register(datatype::KEYWORD, parse_define_datatype);
    registry.register(cases::KEYWORD, parse_cases);
}
