//! # Folder Classifier
//!
//! Classifies a folder name as a system folder, a client folder, or empty.
//!
//! The taxonomy is normalized once into a static set on first use;
//! classification is then a single lookup. Pure and total.

use crate::primitives::SYSTEM_FOLDERS;
use crate::types::FolderClass;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Normalized system folder keys.
static SYSTEM_FOLDER_KEYS: LazyLock<BTreeSet<String>> =
    LazyLock::new(|| SYSTEM_FOLDERS.iter().map(|name| normalize(name)).collect());

/// Trim and lower-case a folder name.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Classify a folder name.
///
/// - `Empty` if the normalized name is empty
/// - `System` if it matches the taxonomy exactly (case-insensitive)
/// - `Client` otherwise
#[must_use]
pub fn classify(name: &str) -> FolderClass {
    let key = normalize(name);
    if key.is_empty() {
        FolderClass::Empty
    } else if SYSTEM_FOLDER_KEYS.contains(&key) {
        FolderClass::System
    } else {
        FolderClass::Client
    }
}

// =============================================================================
// TESTS
// =============================================================================
