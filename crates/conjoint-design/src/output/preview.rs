use serde::Serialize;

use crate::model::Profile;

/// One fully-assembled task for display, with the attribute order the
/// profiles were drawn under.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub attributes: Vec<String>,
    pub previews: Vec<Profile>,
}
