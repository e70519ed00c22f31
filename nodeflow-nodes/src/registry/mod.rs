//! The standard computation registry.
//!
//! Every built-in computation is registered here under its type tag.
//! Callers extend the returned registry with their own computations
//! before handing it to an engine.

use crate::{data, flow, math, text};
use nodeflow_core::ComputationRegistry;

/// Create and populate the standard library registry.
pub fn standard_registry() -> ComputationRegistry {
    let mut registry = ComputationRegistry::new();
    register_standard(&mut registry);
    registry
}

/// Register every standard computation into an existing registry.
///
/// Existing entries with the same tag are replaced.
pub fn register_standard(registry: &mut ComputationRegistry) -> &mut ComputationRegistry {
    // Arithmetic
    registry
        .register(math::Constant)
        .register(math::Add)
        .register(math::Multiply)
        .register(math::Subtract)
        .register(math::Double);

    // Text
    registry
        .register(text::Concat)
        .register(text::Upper)
        .register(text::Lower);

    // Data
    registry
        .register(data::DataSource)
        .register(data::GenericProcess)
        .register(data::Filter)
        .register(data::DataSink);

    // Flow control
    registry.register(flow::Delay);

    tracing::debug!(count = registry.len(), "Registered standard computations");
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeflow_core::prelude::*;

    #[test]
    fn registry_contents() {
        let registry = standard_registry();

        assert_eq!(registry.len(), 13);
        for tag in [
            "math::constant",
            "math::add",
            "math::multiply",
            "math::subtract",
            "math::double",
            "text::concat",
            "text::upper",
            "text::lower",
            "std::data_source",
            "std::generic_process",
            "std::filter",
            "std::data_sink",
            "std::delay",
        ] {
            assert!(registry.contains(tag), "missing {tag}");
        }
        assert!(!registry.contains("nonexistent"));
    }

    #[test]
    fn catalog_describes_default_ports() {
        let registry = standard_registry();

        let add = registry.describe("math::add").unwrap();
        assert!(add.inputs["in"].multi);
        assert_eq!(add.outputs["out"], PortType::Number);

        let sink = registry.describe("std::data_sink").unwrap();
        assert!(sink.outputs.is_empty());
    }

    #[test]
    fn extends_existing_registry() {
        let mut registry = ComputationRegistry::new();
        registry.register_fn(ComputationInfo::new("custom", "noop"), |_| {
            Ok(NodeOutputs::none())
        });
        register_standard(&mut registry);

        assert_eq!(registry.len(), 14);
        assert!(registry.contains("custom::noop"));
    }

    #[test]
    fn listing_is_sorted() {
        let names: Vec<String> = standard_registry().list().into_iter().map(|i| i.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
