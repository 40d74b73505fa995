//! Builders shared by the pipeline tests.

use docket_cli::registry::ReleaseMetadata;
use docket_cli::source::{SourceAdapter, SourceResolver};
use docket_cli::test_utils::FakeSource;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Documentation source of a plugin, with every placeholder and anchor the
/// pipelines rewrite.
pub fn plugin_doc(plugin_type: &str, name: &str) -> String {
    format!(
        ":plugin: {name}\n\
         :type: {plugin_type}\n\
         :version: %VERSION%\n\
         :release_date: %RELEASE_DATE%\n\
         :changelog_url: %CHANGELOG_URL%\n\
         \n\
         [id=\"plugins-{{type}}s-{{plugin}}\"]\n\
         === {name} {plugin_type} plugin\n\
         \n\
         See <<plugins-{{type}}s-{{plugin}}-options>> and <<plugins-{{type}}s-common-options>>.\n"
    )
}

/// Source resolver serving one fake per package; unknown packages get an empty source.
#[derive(Default)]
pub struct Sources {
    by_package: HashMap<String, Arc<FakeSource>>,
}

impl Sources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, package: &str, source: FakeSource) -> Self {
        self.by_package.insert(package.to_string(), Arc::new(source.named(package)));
        self
    }

    pub fn get(&self, package: &str) -> Arc<FakeSource> {
        self.by_package.get(package).cloned().unwrap_or_else(|| Arc::new(FakeSource::new().named(package)))
    }
}

impl SourceResolver for Sources {
    fn resolve(&self, package: &str, _release: &ReleaseMetadata) -> Arc<dyn SourceAdapter> {
        let source: Arc<dyn SourceAdapter> = self.get(package);
        source
    }
}

pub fn read(root: &Path, relative: &str) -> String {
    std::fs::read_to_string(root.join(relative)).unwrap_or_else(|e| panic!("reading {relative}: {e}"))
}
