//! Key-function locator
//!
//! A key function contains at least one call `qualifier.Name(placeholder, ...)`
//! of the configured sentinel. Each function is reported once however many
//! such calls it makes.

use std::collections::BTreeMap;
use std::path::Path;

use ctxfix_ast::{walk_block, CallExpr, DeclarationKind, File, SourceFile};
use ctxfix_graph::FunctionDescriptor;
use serde::Serialize;
use tracing::debug;

use crate::{FixerConfig, Sentinel};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyFunction {
    pub function: FunctionDescriptor,
    /// Sentinel calls with the placeholder argument
    pub sites: usize,
}

pub fn is_sentinel_call(call: &CallExpr, sentinel: &Sentinel) -> bool {
    call.qualified_callee() == Some((sentinel.qualifier.as_str(), sentinel.name.as_str()))
}

/// Key functions declared in one parsed file
pub fn locate_in_file(path: &Path, file: &File, config: &FixerConfig) -> Vec<KeyFunction> {
    let mut found = Vec::new();
    for decl in &file.declarations {
        let DeclarationKind::Function(func) = &decl.kind else {
            continue;
        };
        let Some(body) = &func.body else {
            continue;
        };

        let mut sites = 0;
        walk_block(body, &mut |expr| {
            if let Some(call) = expr.as_call() {
                if is_sentinel_call(call, &config.sentinel)
                    && call.first_arg_ident() == Some(config.placeholder.as_str())
                {
                    sites += 1;
                }
            }
        });

        if sites > 0 {
            let function = FunctionDescriptor::new(path, &file.package.name, func.key_name());
            debug!("key function {} ({} sites)", function, sites);
            found.push(KeyFunction { function, sites });
        }
    }
    found
}

/// Key functions across files, one record per qualified name, sorted
pub fn locate<'a>(
    files: impl IntoIterator<Item = &'a SourceFile>,
    config: &FixerConfig,
) -> Vec<KeyFunction> {
    merge(
        files
            .into_iter()
            .flat_map(|source| locate_in_file(source.path(), source.file(), config)),
    )
}

/// Collapse duplicates by qualified name, summing their sites
pub fn merge(keys: impl IntoIterator<Item = KeyFunction>) -> Vec<KeyFunction> {
    let mut merged: BTreeMap<String, KeyFunction> = BTreeMap::new();
    for key in keys {
        merged
            .entry(key.function.qualified_name())
            .and_modify(|existing| existing.sites += key.sites)
            .or_insert(key);
    }
    merged.into_values().collect()
}
