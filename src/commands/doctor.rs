// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cycle::{Issue, check_state};
use crate::db::StateStore;
use crate::utils::pretty_table;
use anyhow::Result;

/// Runs the invariant checks on the raw stored state and returns what broke.
pub fn diagnose(store: &dyn StateStore) -> Result<Vec<Issue>> {
    Ok(match store.load_raw()? {
        Some(state) => check_state(&state),
        None => Vec::new(),
    })
}

pub fn handle(store: &dyn StateStore) -> Result<()> {
    let issues = diagnose(store)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found in {}", store.location().display());
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.code.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
