#[path = "engravers/common.rs"]
mod common;
#[path = "engravers/raster_properties.rs"]
mod raster_properties;
#[path = "engravers/vector_trace.rs"]
mod vector_trace;
#[path = "engravers/bitmap_engraver.rs"]
mod bitmap_engraver;
