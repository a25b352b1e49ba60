//! WatchableResource implementations for the source kinds
//!
//! The API versions given to `impl_watchable!` must match the `#[kube]`
//! attributes on the model types in `src/models/`. They are used for
//! display and logging; the watcher itself takes the version from the
//! type's metadata.
//!
//! To add a new source kind:
//! 1. Add the model type and its `Source` / `StatusTransitions` impls
//! 2. Add a variant to `SourceKind`
//! 3. Add an `impl_watchable!` line below and a watch call in `watch_all()`

use crate::manifest::SourceManifest;
use crate::models::{GitRepository, HelmChart, SourceKind};

macro_rules! impl_watchable {
    ($type:ty, $group:expr, $version:expr, $plural:expr, $kind:expr, $variant:path) => {
        impl crate::watcher::WatchableResource for $type {
            fn api_group() -> &'static str {
                $group
            }

            fn api_version() -> &'static str {
                $version
            }

            fn plural() -> &'static str {
                $plural
            }

            fn source_kind() -> SourceKind {
                $kind
            }

            fn to_manifest(&self) -> SourceManifest {
                $variant(self.clone())
            }
        }
    };
}

impl_watchable!(
    GitRepository,
    "source.fluxcd.io",
    "v1alpha1",
    "gitrepositories",
    SourceKind::GitRepository,
    SourceManifest::GitRepository
);
impl_watchable!(
    HelmChart,
    "source.fluxcd.io",
    "v1alpha1",
    "helmcharts",
    SourceKind::HelmChart,
    SourceManifest::HelmChart
);
