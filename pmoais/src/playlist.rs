//! Extraction des références de flux depuis les playlists tune-in
//!
//! Ce module contient les fonctions pures utilisées par la chaîne de
//! résolution : lecture de la première ligne d'une réponse tune-in, de
//! l'entrée `File1=` d'un fichier `.pls` et de l'entrée `Ref1=` d'un
//! document de redirection `mms:`.
//!
//! Seule la première entrée d'une playlist est prise en compte.

use crate::constants::{MMS_REF_PREFIX, PLS_ENTRY_PREFIX};
use crate::error::{Error, Result};

/// Référence candidate : première ligne du corps, espaces retirés
pub fn first_line(body: &str) -> String {
    body.lines().next().unwrap_or_default().trim().to_string()
}

/// La référence pointe-t-elle vers un fichier `.pls` ?
pub fn is_pls(reference: &str) -> bool {
    reference.ends_with(".pls")
}

/// La référence utilise-t-elle le schéma `mms:` ?
pub fn is_mms(reference: &str) -> bool {
    reference.starts_with("mms:")
}

/// Réécrit `mms:` en `http:`
pub fn mms_to_http(reference: &str) -> String {
    match reference.strip_prefix("mms:") {
        Some(rest) => format!("http:{}", rest),
        None => reference.to_string(),
    }
}

/// Entrée `File1=` d'un fichier `.pls` (deuxième ligne, après `[playlist]`)
pub fn pls_entry(body: &str) -> Result<String> {
    second_line_entry(body, PLS_ENTRY_PREFIX)
}

/// Entrée `Ref1=` d'un document de redirection `mms:`
pub fn mms_entry(body: &str) -> Result<String> {
    second_line_entry(body, MMS_REF_PREFIX)
}

fn second_line_entry(body: &str, prefix: &str) -> Result<String> {
    let line = body
        .lines()
        .nth(1)
        .map(str::trim)
        .ok_or_else(|| Error::parse(format!("no second line to read {} from", prefix)))?;

    let entry = line.strip_prefix(prefix).unwrap_or(line);
    if entry.is_empty() {
        return Err(Error::parse(format!("empty {} entry", prefix)));
    }

    Ok(entry.to_string())
}
