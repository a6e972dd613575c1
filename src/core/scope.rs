// Module scopes
//
// Which declarables a module makes available to importers (export scope)
// and which ones its own templates can use (compilation scope).

use crate::domain::model::{Catalog, ModuleDescriptor};
use std::collections::{BTreeSet, HashSet};

pub struct ScopeResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> ScopeResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Declarables visible to any module that imports `module`.
    ///
    /// Framework modules and unknown names contribute nothing.
    pub fn export_scope(&self, module: &str) -> BTreeSet<String> {
        let mut visited = HashSet::new();
        self.collect_exports(module, &mut visited)
    }

    /// Declarables usable inside `module`'s own templates.
    pub fn compilation_scope(&self, module: &str) -> BTreeSet<String> {
        let Some(descriptor) = self.catalog.module(module) else {
            return BTreeSet::new();
        };
        let mut scope: BTreeSet<String> = descriptor
            .declarations
            .iter()
            .map(|d| d.name.clone())
            .collect();
        for import in &descriptor.imports {
            scope.extend(self.export_scope(&import.module));
        }
        scope
    }

    /// Whether `name` is exported by at least one of `module`'s imports.
    pub fn imported_export(&self, module: &ModuleDescriptor, name: &str) -> bool {
        module
            .imports
            .iter()
            .any(|import| self.export_scope(&import.module).contains(name))
    }

    fn collect_exports(&self, module: &str, visited: &mut HashSet<String>) -> BTreeSet<String> {
        let mut scope = BTreeSet::new();
        if !visited.insert(module.to_string()) {
            return scope;
        }
        let Some(descriptor) = self.catalog.module(module) else {
            return scope;
        };

        for export in &descriptor.exports {
            if descriptor.declares(export) {
                scope.insert(export.clone());
            } else if self.catalog.module(export).is_some() {
                scope.extend(self.collect_exports(export, visited));
            } else if !self.catalog.is_framework_module(export) {
                // re-export of a declarable that came in through an import
                let reexported = descriptor.imports.iter().any(|import| {
                    self.collect_exports(&import.module, &mut visited.clone())
                        .contains(export)
                });
                if reexported {
                    scope.insert(export.clone());
                }
            }
        }

        scope
    }
}
