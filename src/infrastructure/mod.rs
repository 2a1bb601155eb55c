// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod glyphs;
pub mod http_response;
pub mod json_mapper;
pub mod nominatim_geocoder;
pub mod openroute_provider;
pub mod png_canvas;
