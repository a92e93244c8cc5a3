//! signage-customizer: live pricing and vector previews for made-to-order signs
//!
//! This crate turns a product's base price plus the options a buyer has
//! picked into a final integer price and a self-contained SVG preview, for
//! three product families: engraved name plates, individual metal letters
//! and neon signs.
//!
//! # Example
//!
//! ```
//! use signage_customizer::{
//!     BuiltinCatalog, CustomizationSession, EngineConfig, Product,
//! };
//!
//! let product = Product::new(2499.0, "NeonSigns");
//! let mut session = CustomizationSession::open(product, &BuiltinCatalog, EngineConfig::default());
//!
//! session.set_text("open late");
//! session.select_option("ns-size-36x18").unwrap();
//! assert_eq!(session.price(), 3299);
//! assert!(session.preview().markup.contains("OPEN LATE"));
//!
//! // Unlit tubes have no glow filter
//! session.set_powered(false);
//! assert!(!session.preview().markup.contains("feGaussianBlur"));
//! ```
//!
//! # Rendering without a session
//!
//! Every renderer can be driven directly with its own parameters:
//!
//! ```
//! use signage_customizer::{MetalLettersParams, PreviewRenderer};
//!
//! let params = MetalLettersParams {
//!     text: "ACME".into(),
//!     ..Default::default()
//! };
//! let preview = params.render();
//! assert_eq!(preview.width, 540.0);
//! ```
//!
//! # Saving a design
//!
//! Sessions implement [`Configurable`], so a design can be exported to JSON
//! and restored later:
//!
//! ```
//! use signage_customizer::{
//!     BuiltinCatalog, Configurable, CustomizationSession, DesignProfile, EngineConfig, Product,
//! };
//!
//! let product = Product::new(999.0, "NamePlates");
//! let mut session = CustomizationSession::open(product.clone(), &BuiltinCatalog, EngineConfig::default());
//! session.set_text("Reception");
//! let json = session.export_profile().to_json().unwrap();
//!
//! let mut restored = CustomizationSession::open(product, &BuiltinCatalog, EngineConfig::default());
//! restored.apply_profile(&DesignProfile::from_json(&json).unwrap());
//! assert_eq!(restored.state().lines, vec!["Reception"]);
//! ```

mod catalog;
mod color;
mod config;
mod error;
pub mod markup;
mod pricing;
pub mod raster;
pub mod render;
mod session;
mod snapshot;

pub use catalog::{
    BuiltinCatalog, CatalogSource, Category, CustomizationOption, ModifierType, OptionType,
    Product,
};
pub use color::{HexColor, adjust_brightness};
pub use config::{EngineConfig, TextLimits};
pub use error::{Error, Result};
pub use markup::escape_xml;
pub use pricing::{Modifier, PriceCalculator, PriceFloor, PricedCustomization, price};
pub use render::{
    MetalLettersParams, NEON_PALETTE, NamePlateParams, NeonPaletteEntry, NeonSignParams,
    PlateBackground, PreviewDispatcher, PreviewInputs, PreviewRenderer, RenderedPreview,
};
pub use session::{
    Configurable, CustomizationSession, CustomizationState, DesignProfile, SessionPhase,
    normalize_text, recompute,
};
pub use snapshot::{CartLine, CartSink, CustomizationSnapshot, OptionRef};
