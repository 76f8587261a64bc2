use std::collections::HashSet;

use chrono::Utc;

/// Server-assigned record id: the current epoch-millis rendered as a
/// string, bumped by one until it does not collide with a taken id.
pub(crate) fn next_epoch_id(taken: &HashSet<String>) -> String {
    let mut candidate = Utc::now().timestamp_millis();
    loop {
        let id = candidate.to_string();
        if !taken.contains(&id) {
            return id;
        }
        candidate += 1;
    }
}
