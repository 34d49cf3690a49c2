//! The ordered set of images waiting to be submitted.
//!
//! Order is insertion order. The endpoint does not care about it; it keeps
//! listings and test assertions deterministic. Entries are looked up by
//! [`ContentId`], never by index.

use crate::types::{ContentId, ImageDescriptor};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadBatch {
    images: Vec<ImageDescriptor>,
}

impl UploadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, descriptor: ImageDescriptor) {
        self.images.push(descriptor);
    }

    /// Remove the first entry with the given content. Other entries keep
    /// their identity and relative order.
    pub fn remove(&mut self, id: &ContentId) -> Option<ImageDescriptor> {
        let pos = self
            .images
            .iter()
            .position(|d| d.content_id.as_ref() == Some(id))?;
        Some(self.images.remove(pos))
    }

    /// Empty the batch, handing back what was in it.
    pub fn clear(&mut self) -> Vec<ImageDescriptor> {
        std::mem::take(&mut self.images)
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.images.iter().any(|d| d.content_id.as_ref() == Some(id))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageDescriptor> {
        self.images.iter()
    }

    pub fn as_slice(&self) -> &[ImageDescriptor] {
        &self.images
    }

    /// Owned copy of the current contents, e.g. for a request in flight.
    pub fn snapshot(&self) -> Vec<ImageDescriptor> {
        self.images.clone()
    }
}

impl<'a> IntoIterator for &'a UploadBatch {
    type Item = &'a ImageDescriptor;
    type IntoIter = std::slice::Iter<'a, ImageDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}
