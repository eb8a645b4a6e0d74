use crate::handle::ImageHandle;

/// One page image with its reading-order index.
#[derive(Debug)]
pub struct Panel {
    index: usize,
    source_file_name: String,
    handle: ImageHandle,
}

impl Panel {
    pub(crate) fn new(index: usize, source_file_name: String, handle: ImageHandle) -> Self {
        Self {
            index,
            source_file_name,
            handle,
        }
    }

    /// 0-based position in reading order
    pub fn index(&self) -> usize {
        self.index
    }

    /// Entry path inside the archive
    pub fn source_file_name(&self) -> &str {
        &self.source_file_name
    }

    pub fn handle(&self) -> &ImageHandle {
        &self.handle
    }

    pub(crate) fn handle_mut(&mut self) -> &mut ImageHandle {
        &mut self.handle
    }
}
