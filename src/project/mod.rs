//! Project file describing what to split out of an image.
//!
//! ```ini
//! name=chrmodels
//! game=SA2B
//!
//! [SonicModel]
//! type=model
//! filename=Sonic/Sonic.sa2mdl
//!
//! [SonicActions]
//! type=actionarray
//! filename=Sonic/Anims
//! length=4
//! filename2_a=Run
//! ```
//!
//! Every section is one directive, processed in file order.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SplitError};
use crate::formats::ini::{self, IniDocument, IniSection};
use crate::ninja::Game;

/// Declared type of an exported symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveKind {
    LandTable,
    BattleLandTable,
    LandTableArray,
    Model,
    BasicModel,
    BasicDxModel,
    ChunkModel,
    GcModel,
    Morph,
    ChunkAttach,
    ModelArray,
    BasicModelArray,
    BasicDxModelArray,
    ChunkModelArray,
    GcModelArray,
    ModelsArray,
    ActionArray,
    Motion,
    MotionArray,
    TexList,
    TexListArray,
    AnimIndexList,
    CharaObjectDataList,
    KartSpecialInfoList,
    MotionTable,
    ChaoMotionTable,
    CActionArray,
}

const KINDS: [(&str, DirectiveKind); 27] = [
    ("landtable", DirectiveKind::LandTable),
    ("battlelandtable", DirectiveKind::BattleLandTable),
    ("landtablearray", DirectiveKind::LandTableArray),
    ("model", DirectiveKind::Model),
    ("basicmodel", DirectiveKind::BasicModel),
    ("basicdxmodel", DirectiveKind::BasicDxModel),
    ("chunkmodel", DirectiveKind::ChunkModel),
    ("gcmodel", DirectiveKind::GcModel),
    ("morph", DirectiveKind::Morph),
    ("chunkattach", DirectiveKind::ChunkAttach),
    ("modelarray", DirectiveKind::ModelArray),
    ("basicmodelarray", DirectiveKind::BasicModelArray),
    ("basicdxmodelarray", DirectiveKind::BasicDxModelArray),
    ("chunkmodelarray", DirectiveKind::ChunkModelArray),
    ("gcmodelarray", DirectiveKind::GcModelArray),
    ("modelsarray", DirectiveKind::ModelsArray),
    ("actionarray", DirectiveKind::ActionArray),
    ("motion", DirectiveKind::Motion),
    ("motionarray", DirectiveKind::MotionArray),
    ("texlist", DirectiveKind::TexList),
    ("texlistarray", DirectiveKind::TexListArray),
    ("animindexlist", DirectiveKind::AnimIndexList),
    ("charaobjectdatalist", DirectiveKind::CharaObjectDataList),
    ("kartspecialinfolist", DirectiveKind::KartSpecialInfoList),
    ("motiontable", DirectiveKind::MotionTable),
    ("chaomotiontable", DirectiveKind::ChaoMotionTable),
    ("cactionarray", DirectiveKind::CActionArray),
];

impl DirectiveKind {
    /// Look up a type tag; unknown tags yield `None`
    pub fn from_tag(tag: &str) -> Option<Self> {
        KINDS
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(tag.trim()))
            .map(|(_, k)| *k)
    }

    pub fn tag(self) -> &'static str {
        KINDS
            .iter()
            .find(|(_, k)| *k == self)
            .map(|(t, _)| *t)
            .unwrap_or("")
    }

    /// Whether the export is an array of pointers walked `length` times
    pub fn is_pointer_array(self) -> bool {
        matches!(
            self,
            DirectiveKind::LandTableArray
                | DirectiveKind::ModelArray
                | DirectiveKind::BasicModelArray
                | DirectiveKind::BasicDxModelArray
                | DirectiveKind::ChunkModelArray
                | DirectiveKind::GcModelArray
                | DirectiveKind::ModelsArray
                | DirectiveKind::ActionArray
                | DirectiveKind::MotionArray
                | DirectiveKind::TexListArray
                | DirectiveKind::CActionArray
        )
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Keys with a fixed meaning; everything else is a custom property
const RESERVED_KEYS: [&str; 3] = ["type", "filename", "length"];

/// One configured extraction task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub export: String,
    /// Type tag as written in the project file
    pub type_tag: String,
    pub kind: Option<DirectiveKind>,
    pub filename: Option<String>,
    pub length: usize,
    pub custom: Vec<(String, String)>,
}

impl Directive {
    fn from_section(section: &IniSection) -> Result<Self> {
        let export = section.name().to_string();
        let type_tag = section
            .get("type")
            .ok_or_else(|| SplitError::missing(&export, "type"))?
            .to_string();
        let length = match section.get("length") {
            Some(v) => v
                .parse::<usize>()
                .map_err(|_| SplitError::invalid(&export, "length", v))?,
            None => 0,
        };
        let custom = section
            .entries()
            .filter(|(k, _)| !RESERVED_KEYS.iter().any(|r| r.eq_ignore_ascii_case(k)))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Ok(Self {
            kind: DirectiveKind::from_tag(&type_tag),
            export,
            type_tag,
            filename: section.get("filename").map(str::to_string),
            length,
            custom,
        })
    }

    /// Custom property lookup, case-insensitive on the key
    pub fn property(&self, key: &str) -> Option<&str> {
        self.custom
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// `filename<i>` override for element `index`
    pub fn element_name(&self, index: usize) -> Option<&str> {
        self.property(&format!("filename{}", index))
    }

    /// `filename<i>_<suffix>` override, e.g. `_a` for an action's motion
    pub fn element_part(&self, index: usize, suffix: &str) -> Option<&str> {
        self.property(&format!("filename{}_{}", index, suffix))
    }

    pub fn require_filename(&self) -> Result<&str> {
        self.filename
            .as_deref()
            .ok_or_else(|| SplitError::missing(&self.export, "filename"))
    }

    /// Required `nodecount` property
    pub fn node_count(&self) -> Result<usize> {
        let v = self
            .property("nodecount")
            .ok_or_else(|| SplitError::missing(&self.export, "nodecount"))?;
        v.trim()
            .parse()
            .map_err(|_| SplitError::invalid(&self.export, "nodecount", v))
    }

    /// Required `nodecounts` property, one count per array element
    pub fn node_counts(&self) -> Result<Vec<usize>> {
        let v = self
            .property("nodecounts")
            .ok_or_else(|| SplitError::missing(&self.export, "nodecounts"))?;
        v.split(',')
            .map(|n| {
                n.trim()
                    .parse()
                    .map_err(|_| SplitError::invalid(&self.export, "nodecounts", v))
            })
            .collect()
    }
}

/// Parsed project file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    pub name: String,
    pub game: Game,
    pub directives: Vec<Directive>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SplitError::io(path, e))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::from_document(&ini::parse(text)?)
    }

    pub fn from_document(doc: &IniDocument) -> Result<Self> {
        let globals = doc.globals();
        let game_text = globals
            .get("game")
            .ok_or_else(|| SplitError::Config("project file has no 'game' key".into()))?;
        let game = game_text.parse::<Game>().map_err(SplitError::Config)?;

        let directives = doc
            .sections()
            .iter()
            .filter(|s| !s.name().is_empty())
            .map(Directive::from_section)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: globals.get("name").unwrap_or_default().to_string(),
            game,
            directives,
        })
    }
}
