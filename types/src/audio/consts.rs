use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Voice {
    #[default]
    Alloy,
    Ash,
    Ballad,
    Coral,
    Echo,
    Sage,
    Shimmer,
    Verse,
    Custom(String),
}

impl Voice {
    pub fn as_str(&self) -> &str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Ash => "ash",
            Voice::Ballad => "ballad",
            Voice::Coral => "coral",
            Voice::Echo => "echo",
            Voice::Sage => "sage",
            Voice::Shimmer => "shimmer",
            Voice::Verse => "verse",
            Voice::Custom(s) => s,
        }
    }
}

impl Serialize for Voice {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "alloy" => Voice::Alloy,
            "ash" => Voice::Ash,
            "ballad" => Voice::Ballad,
            "coral" => Voice::Coral,
            "echo" => Voice::Echo,
            "sage" => Voice::Sage,
            "shimmer" => Voice::Shimmer,
            "verse" => Voice::Verse,
            _ => Voice::Custom(s.to_string()),
        })
    }
}

impl<'de> Deserialize<'de> for Voice {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let Ok(voice) = Voice::from_str(&s);
        Ok(voice)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum TranscriptionModel {
    #[default]
    Whisper,
    Custom(String),
}

impl Serialize for TranscriptionModel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TranscriptionModel::Whisper => serializer.serialize_str("whisper-1"),
            TranscriptionModel::Custom(s) => serializer.serialize_str(s),
        }
    }
}

impl FromStr for TranscriptionModel {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "whisper-1" => TranscriptionModel::Whisper,
            _ => TranscriptionModel::Custom(s.to_string()),
        })
    }
}

impl<'de> Deserialize<'de> for TranscriptionModel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let Ok(model) = TranscriptionModel::from_str(&s);
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Serialize, serde::Deserialize)]
    struct AudioConsts {
        #[serde(skip_serializing_if = "Option::is_none")]
        voice: Option<Voice>,
        #[serde(skip_serializing_if = "Option::is_none")]
        model: Option<TranscriptionModel>,
    }

    #[test]
    fn known_and_custom_names_serialize_as_plain_strings() {
        let consts = AudioConsts {
            voice: Some(Voice::Alloy),
            model: Some(TranscriptionModel::Whisper),
        };
        let json = serde_json::to_string(&consts).unwrap();
        assert_eq!(json, r#"{"voice":"alloy","model":"whisper-1"}"#);

        let consts = AudioConsts {
            voice: Some(Voice::Custom("marin".to_string())),
            model: None,
        };
        assert_eq!(serde_json::to_string(&consts).unwrap(), r#"{"voice":"marin"}"#);
    }

    #[test]
    fn unknown_names_deserialize_to_custom() {
        let consts: AudioConsts =
            serde_json::from_str(r#"{"voice":"cedar","model":"gpt-4o-transcribe"}"#).unwrap();
        assert_eq!(consts.voice, Some(Voice::Custom("cedar".to_string())));
        assert_eq!(
            consts.model,
            Some(TranscriptionModel::Custom("gpt-4o-transcribe".to_string()))
        );
    }
}
