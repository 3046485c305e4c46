use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::docker::{Engine, ImageId};

use super::console::LossyWriter;
use super::guard::ContainerGuard;
use super::types::{BuildReport, Stage, WorkflowInput};

/// Build the model image and export it to `input.output`.
///
/// Progress markers and the fetch command's output go to `out`. Once the
/// temporary container exists it is removed before this returns, whatever
/// the outcome; a removal failure is never reported in place of the stage
/// error.
pub fn run_workflow<E, W>(engine: &E, input: &WorkflowInput, out: &mut W) -> Result<BuildReport>
where
    E: Engine + ?Sized,
    W: Write,
{
    announce(out, Stage::Pull, input)?;
    engine
        .pull(&input.base_image)
        .with_context(|| format!("failed to {}", Stage::Pull))?;

    announce(out, Stage::Create, input)?;
    let id = engine
        .run_detached(&input.base_image)
        .with_context(|| format!("failed to {}", Stage::Create))?;
    info!(container = %id.short(), "temporary container started");
    let container = ContainerGuard::new(engine, id);

    let result = build_in_container(engine, &container, input, out);

    let _ = writeln!(out, "==> Cleaning up temporary container...");
    container.remove();

    result
}

fn build_in_container<E, W>(
    engine: &E,
    container: &ContainerGuard<'_, E>,
    input: &WorkflowInput,
    out: &mut W,
) -> Result<BuildReport>
where
    E: Engine + ?Sized,
    W: Write,
{
    announce(out, Stage::Fetch, input)?;
    let mut console = LossyWriter::new(&mut *out);
    engine
        .exec(container.id(), &input.fetch_command, &mut console)
        .with_context(|| format!("failed to {}", Stage::Fetch))?;
    console.finish()?;

    announce(out, Stage::Stop, input)?;
    engine
        .stop(container.id())
        .with_context(|| format!("failed to {}", Stage::Stop))?;

    announce(out, Stage::Commit, input)?;
    let image_id = engine
        .commit(container.id(), &input.image_name)
        .with_context(|| format!("failed to {} {}", Stage::Commit, input.image_name))?;
    info!(image = %input.image_name, id = %image_id, "image committed");

    announce(out, Stage::Export, input)?;
    let archive_bytes = export_archive(engine, &image_id, &input.output)
        .with_context(|| format!("failed to {} to {}", Stage::Export, input.output.display()))?;
    info!(path = %input.output.display(), bytes = archive_bytes, "archive written");

    let report = BuildReport {
        model: input.model.clone(),
        base_image: input.base_image.clone(),
        image: input.image_name.to_string(),
        image_id: image_id.to_string(),
        archive: input.output.clone(),
        archive_bytes,
    };
    print_summary(out, &report)?;
    Ok(report)
}

/// Create (or truncate) the archive and stream the image into it. The file
/// is closed when this returns.
fn export_archive<E: Engine + ?Sized>(engine: &E, image: &ImageId, path: &Path) -> Result<u64> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let bytes = engine.export(image, &mut file)?;
    file.flush()?;
    Ok(bytes)
}

fn announce<W: Write>(out: &mut W, stage: Stage, input: &WorkflowInput) -> Result<()> {
    info!(stage = %stage, "stage started");
    writeln!(out, "{}", stage.banner(input))?;
    out.flush()?;
    Ok(())
}

fn print_summary<W: Write>(out: &mut W, report: &BuildReport) -> Result<()> {
    let archive = report.archive.display();
    writeln!(out, "Finished!")?;
    writeln!(out, "Image saved to: {archive}")?;
    writeln!(out, "On the offline server, run:")?;
    writeln!(out, "  docker load -i {archive}")?;
    writeln!(out, "Your image will be available as '{}'.", report.image)?;
    Ok(())
}
