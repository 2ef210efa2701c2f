use rand::Rng;

use crate::prefs::PrefStore;

/// Preference key the persisted client id lives under. Store implementations
/// prepend their own namespace.
pub const CLIENT_ID_PREF: &str = "gaCid";

/// Four hex digits from a uniform 16-bit draw.
fn quad(rng: &mut impl Rng) -> String {
    format!("{:04x}", rng.random::<u16>())
}

/// Generate a fresh client identifier: hex groups in an 8-4-4-4-12 shape.
pub fn generate_client_id() -> String {
    let mut rng = rand::rng();
    format!(
        "{}{}-{}-{}-{}-{}{}{}",
        quad(&mut rng),
        quad(&mut rng),
        quad(&mut rng),
        quad(&mut rng),
        quad(&mut rng),
        quad(&mut rng),
        quad(&mut rng),
        quad(&mut rng),
    )
}

/// Read the persisted client id, generating and storing one on first run.
///
/// Idempotent within one store scope: later calls return whatever the first
/// call wrote. The read-then-write is not guarded, so two trackers sharing a
/// scope can both generate on first use; the second write wins silently.
pub fn get_or_create_client_id(store: &dyn PrefStore) -> String {
    if let Some(cid) = store.get(CLIENT_ID_PREF) {
        return cid;
    }
    let cid = generate_client_id();
    store.set(CLIENT_ID_PREF, &cid);
    cid
}
