use crate::consts::{BlockId, MAX_NAME, MAX_PATH, ROOT_BLOCK};
use crate::driver::BlockDevice;
use crate::io::Io;
use crate::structure::directory::Directory;
use crate::structure::FileKind;
use crate::util::error::FsError;

/// Splits an absolute pathname into its components. The root itself is the
/// empty component sequence. A single trailing separator is tolerated, but a
/// doubled separator anywhere is not.
pub(crate) fn parse(pathname: &str) -> Result<Vec<String>, FsError> {
    if pathname.is_empty() {
        return Err(FsError::EmptyPath);
    }

    if !pathname.starts_with('/') {
        return Err(FsError::NotAbsolute);
    }

    if pathname.contains("//") {
        return Err(FsError::DoubleSeparator);
    }

    let trimmed = pathname.strip_suffix('/').unwrap_or(pathname);
    let mut components = Vec::new();

    for component in trimmed.split('/').skip(1) {
        if component.len() > MAX_NAME {
            return Err(FsError::ComponentTooLong(component.to_string()));
        }
        components.push(component.to_string());
    }

    if components.len() > MAX_PATH {
        return Err(FsError::PathTooDeep);
    }

    Ok(components)
}

/// Walks the directory tree from the root and returns the block id of the
/// final component. An empty sequence resolves to the root block. A file in
/// an interior position fails the walk.
pub(crate) fn traverse<D: BlockDevice>(
    io: &Io<D>,
    components: &[String],
) -> Result<BlockId, FsError> {
    let mut current = ROOT_BLOCK;

    for (position, component) in components.iter().enumerate() {
        let directory = Directory { id: current };
        let kind = directory.kind_of(io, component)?;

        if kind == FileKind::File && position < components.len() - 1 {
            return Err(FsError::NotADirectory(component.clone()));
        }

        current = directory.start_of(io, component)?;
    }

    Ok(current)
}

/// All components but the last. The parent of the root is the root itself.
pub(crate) fn dirname(components: &[String]) -> &[String] {
    match components.len() {
        0 => components,
        n => &components[..n - 1],
    }
}
