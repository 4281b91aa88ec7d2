use std::time::{SystemTime, UNIX_EPOCH};

/// Horodatage Unix en millisecondes (0 si l'horloge système est avant l'epoch).
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
