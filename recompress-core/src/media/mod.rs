//! Media introspection
//!
//! Everything the pipeline knows about an input file comes from ffprobe via
//! [`probe::probe_media`], condensed into a [`MediaDescriptor`].

pub mod probe;

pub use probe::{MediaDescriptor, probe_media};
