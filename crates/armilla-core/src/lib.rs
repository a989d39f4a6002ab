//! Armilla Core Types and Definitions
//!
//! This crate provides the foundational types for the Armilla diagram
//! compiler. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric types and polyline helpers ([`geometry`] module)
//! - **Draw**: Layered SVG draw primitives and strokes ([`draw`] module)
//! - **Text**: Font-metric text measurement ([`text::TextMeasurer`])
//! - **Shapes**: The shape capability contract and built-in catalog ([`shape`] module)
//! - **Registry**: Shape identifier resolution with alias and typo handling
//!   ([`registry::ShapeRegistry`])

pub mod color;
pub mod draw;
pub mod geometry;
pub mod identifier;
pub mod registry;
pub mod shape;
pub mod text;
