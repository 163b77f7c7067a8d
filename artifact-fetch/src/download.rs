use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

pub const CHUNK_SIZE: usize = 1024;

/// Streams `body` into `dest`, creating parent directories. `len` sizes the
/// progress bar when the server announces it.
pub fn download_to<R: Read>(body: R, len: Option<u64>, dest: &Path) -> Result<u64> {
    let pb = ProgressBar::with_draw_target(len, ProgressDrawTarget::stderr()).with_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold} [{elapsed}] {wide_bar:.green} {bytes}/{total_bytes} {msg}")?
            .progress_chars("█▇▆▅▄▃▂▁  "),
    );
    if let Some(name) = dest.file_name() {
        pb.set_prefix(name.to_string_lossy().into_owned());
    }
    pb.set_message("downloading");

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(dest).with_context(|| format!("failed to create {}", dest.display()))?;
    let written = copy_chunked(body, file, |n| pb.inc(n as u64))
        .with_context(|| format!("failed to download {}", dest.display()))?;
    pb.finish_with_message("downloaded");
    tracing::info!(path = %dest.display(), bytes = written, "downloaded");
    Ok(written)
}

/// Copies in `CHUNK_SIZE` pieces, flushing after every write.
pub fn copy_chunked<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    mut on_chunk: impl FnMut(usize),
) -> Result<u64> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total = 0;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        writer.write_all(&buf[..n])?;
        writer.flush()?;
        total += n as u64;
        on_chunk(n);
    }
    Ok(total)
}
