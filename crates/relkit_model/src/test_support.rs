//! Builders shared by the unit tests.

use std::path::Path;

use crate::context::ReleaseContext;
use crate::model::ReleaseModel;
use crate::secrets::MapSecretResolver;

/// A model for project `app` at `version`.
pub(crate) fn model(version: &str) -> ReleaseModel {
    let mut model = ReleaseModel::default();
    model.project_mut().unwrap().set_name("app").unwrap();
    model.project_mut().unwrap().set_version(version).unwrap();
    model
}

/// Resolves and freezes `model` without any secrets.
pub(crate) fn context(model: ReleaseModel) -> ReleaseContext {
    ReleaseContext::with_resolver(".", model, Box::new(MapSecretResolver::new())).unwrap()
}

/// Resolves and freezes `model` with template files under `base_dir`.
pub(crate) fn context_in(base_dir: &Path, model: ReleaseModel, resolver: MapSecretResolver) -> ReleaseContext {
    ReleaseContext::with_resolver(base_dir, model, Box::new(resolver)).unwrap()
}
