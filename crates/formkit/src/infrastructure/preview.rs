//! Preview provider that hands out opaque URLs and tracks which are live

use dashmap::DashSet;

use crate::domain::value_objects::FileHandle;
use crate::ports::outbound::PreviewProvider;

#[derive(Default)]
pub struct TrackingPreviewProvider {
    live: DashSet<String>,
}

impl TrackingPreviewProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previews created and not yet released
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl PreviewProvider for TrackingPreviewProvider {
    fn create(&self, file: &FileHandle) -> Option<String> {
        let url = format!("preview://{}/{}", file.id, file.file_name);
        self.live.insert(url.clone());
        Some(url)
    }

    fn release(&self, url: &str) {
        if self.live.remove(url).is_none() {
            tracing::warn!(%url, "released unknown preview");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fill::FillSession;
    use crate::domain::aggregates::FormDefinition;
    use crate::domain::value_objects::{FieldDefinition, FieldKind};
    use std::sync::Arc;

    #[test]
    fn test_session_leaves_nothing_live() {
        let provider = Arc::new(TrackingPreviewProvider::new());
        let mut form = FormDefinition::create("Photos");
        form.add_field(FieldDefinition::new("photo", "Photo", FieldKind::File(Default::default())));
        let field = form.fields()[0].id.clone();

        let mut session = FillSession::new(form, provider.clone());
        session.attach(&field, vec![FileHandle::new("a.jpg", "image/jpeg", 1)]).unwrap();
        assert_eq!(provider.live_count(), 1);

        session.attach(&field, vec![FileHandle::new("b.jpg", "image/jpeg", 1)]).unwrap();
        assert_eq!(provider.live_count(), 1);

        drop(session);
        assert_eq!(provider.live_count(), 0);
    }
}
