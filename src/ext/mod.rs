mod escape_ext;

pub use escape_ext::EscapeExt;
