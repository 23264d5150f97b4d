mod docx;
mod error;
pub mod model;
pub mod render;
pub mod source;
pub mod visitor;
pub mod walk;

pub use docx::DocxPackage;
pub use error::{Error, Result};
pub use render::{TextOptions, TextRenderer};
pub use source::{DocumentSource, MemorySource, PartScope};
pub use visitor::DocumentVisitor;
pub use walk::Walker;
pub use walk::sections::{Section, SectionResolver};

use std::path::Path;
use std::time::Instant;

/// Resolve the sections of `source` and walk it once, driving `visitor`.
pub fn walk<S, V>(source: &S, visitor: &mut V) -> std::result::Result<(), V::Error>
where
    S: DocumentSource + ?Sized,
    V: DocumentVisitor,
{
    let mut resolver = SectionResolver::new();
    let sections = resolver.initialize(source.body(), source.final_section());
    Walker::new(source, sections).start(visitor)
}

pub fn docx_to_text(input: &Path, options: &TextOptions) -> Result<String> {
    let t0 = Instant::now();
    let package = DocxPackage::open(input)?;
    render_text(&package, options, t0)
}

pub fn docx_bytes_to_text(input: Vec<u8>, options: &TextOptions) -> Result<String> {
    let t0 = Instant::now();
    let package = DocxPackage::from_bytes(input)?;
    render_text(&package, options, t0)
}

fn render_text(package: &DocxPackage, options: &TextOptions, t0: Instant) -> Result<String> {
    let t_parse = t0.elapsed();

    let mut renderer = TextRenderer::new(options.clone());
    walk(package, &mut renderer)?;
    let text = renderer.into_text();
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, walk={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_total - t_parse).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        text.len(),
    );

    Ok(text)
}
