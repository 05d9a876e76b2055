//! Tile selection and download planning from CLI flags.

use std::path::Path;

use tilefind_core::aoi::Tile;
use tilefind_core::downloader::{plan_folder, DownloadTask};

use super::InputError;

/// Tiles named by `ids`, in list order; all tiles when `ids` is empty.
/// Every requested id must be in the result set.
pub fn select_tiles<'a>(tiles: &'a [Tile], ids: &[String]) -> Result<Vec<&'a Tile>, InputError> {
    if ids.is_empty() {
        return Ok(tiles.iter().collect());
    }
    let missing: Vec<&str> = ids
        .iter()
        .map(String::as_str)
        .filter(|id| !tiles.iter().any(|t| t.id == *id))
        .collect();
    if !missing.is_empty() {
        return Err(InputError(format!(
            "tile(s) not found for this AOI: {}",
            missing.join(", ")
        )));
    }
    Ok(tiles
        .iter()
        .filter(|t| ids.iter().any(|id| *id == t.id))
        .collect())
}

/// Download tasks for the selected tiles, or `None` when no download target
/// was given. `--download-to` needs exactly one selected tile.
pub fn plan_tasks(
    selected: &[&Tile],
    download_dir: Option<&Path>,
    download_to: Option<&Path>,
) -> Result<Option<Vec<DownloadTask>>, InputError> {
    match (download_dir, download_to) {
        (Some(dir), _) => Ok(Some(plan_folder(
            selected.iter().map(|t| t.url.as_str()),
            dir,
        ))),
        (None, Some(file)) => match selected {
            [only] => Ok(Some(vec![DownloadTask::to_file(only.url.clone(), file)])),
            _ => Err(InputError(format!(
                "--download-to needs exactly one tile but {} are selected; pick one with --tile",
                selected.len()
            ))),
        },
        (None, None) => Ok(None),
    }
}
