//! Narrator voice lookup.

use serde::Serialize;

/// Preset key used when nothing else matches.
pub const DEFAULT_VOICE: &str = "jorge";

/// A named Edge neural voice.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoicePreset {
    pub key: &'static str,
    pub id: &'static str,
    pub name: &'static str,
    pub region: &'static str,
    pub gender: &'static str,
}

/// Spanish narrator presets.
pub const PRESETS: &[VoicePreset] = &[
    VoicePreset {
        key: "alvaro",
        id: "es-ES-AlvaroNeural",
        name: "Álvaro",
        region: "España",
        gender: "Masculino",
    },
    VoicePreset {
        key: "alonso",
        id: "es-US-AlonsoNeural",
        name: "Alonso",
        region: "EE.UU.",
        gender: "Masculino",
    },
    VoicePreset {
        key: "jorge",
        id: "es-MX-JorgeNeural",
        name: "Jorge",
        region: "México",
        gender: "Masculino",
    },
    VoicePreset {
        key: "dalia",
        id: "es-MX-DaliaNeural",
        name: "Dalia",
        region: "México",
        gender: "Femenino",
    },
];

/// Preview sentences by language code.
const SAMPLE_TEXTS: &[(&str, &str)] = &[
    ("es", "Hola, soy tu narrador. Así sonará tu audiolibro con esta voz."),
    ("en", "Hello, I am your narrator. This is how your audiobook will sound with this voice."),
    ("fr", "Bonjour, je suis votre narrateur. Voici comment votre livre audio sonnera avec cette voix."),
    ("de", "Hallo, ich bin Ihr Erzähler. So wird Ihr Hörbuch mit dieser Stimme klingen."),
    ("pt", "Olá, eu sou o seu narrador. É assim que o seu audiolivro vai soar com esta voz."),
    ("it", "Ciao, sono il tuo narratore. Ecco come suonerà il tuo audiolibro con questa voce."),
];

/// A resolved voice: the id sent to the narration service plus a display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Voice {
    pub id: String,
    pub label: String,
}

impl From<&VoicePreset> for Voice {
    fn from(preset: &VoicePreset) -> Self {
        Self {
            id: preset.id.to_string(),
            label: preset.name.to_string(),
        }
    }
}

/// Find a preset by key (case-insensitive).
pub fn find_preset(key: &str) -> Option<&'static VoicePreset> {
    PRESETS.iter().find(|p| p.key.eq_ignore_ascii_case(key))
}

fn default_preset() -> &'static VoicePreset {
    find_preset(DEFAULT_VOICE).unwrap_or(&PRESETS[0])
}

/// Resolve a preset key or a full voice id (`es-MX-JorgeNeural`).
///
/// Anything unrecognised resolves to the default preset.
pub fn resolve(key_or_id: &str) -> Voice {
    let key_or_id = key_or_id.trim();

    if let Some(preset) = find_preset(key_or_id) {
        return preset.into();
    }

    if is_voice_id(key_or_id) {
        return Voice {
            id: key_or_id.to_string(),
            label: label_from_id(key_or_id),
        };
    }

    default_preset().into()
}

/// Display label of a voice id: its last segment without the "Neural" suffix.
pub fn label_from_id(id: &str) -> String {
    id.rsplit('-').next().unwrap_or(id).replace("Neural", "")
}

fn is_voice_id(s: &str) -> bool {
    let parts: Vec<&str> = s.split('-').collect();
    parts.len() >= 3 && parts.iter().all(|p| !p.is_empty())
}

/// Preview sentence for a voice, chosen by the voice id's language prefix.
pub fn sample_text(voice_id: &str) -> &'static str {
    let lang = voice_id.split('-').next().unwrap_or("es");
    SAMPLE_TEXTS
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(lang))
        .or_else(|| SAMPLE_TEXTS.iter().find(|(code, _)| *code == "en"))
        .map(|(_, text)| *text)
        .unwrap_or(SAMPLE_TEXTS[0].1)
}
