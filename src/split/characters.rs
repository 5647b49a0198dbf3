//! Character select and kart tables. Each writes one folder of models and
//! motions plus an `info.ini` listing the entries.

use std::path::{Path, PathBuf};

use super::Session;
use crate::assets::{AnimationFile, ModelFile};
use crate::error::{DecodeContext, Result, SplitError};
use crate::formats::ini::{IniDocument, IniSection};
use crate::ninja::tables::{
    AnimatedModel, CharaObjectData, KartSpecialInfo, CHARA_OBJECT_NAMES, CHARA_OBJECT_SIZE,
    KART_SPECIAL_INFO_SIZE,
};
use crate::project::Directive;

impl Session<'_> {
    /// Write a model and its motions as `<stem>.sa2mdl` and
    /// `<stem> Anim <k>.saanim`; the section gets the model key and one
    /// `<anim_key><k>` per motion
    fn write_animated(
        &mut self,
        dir: &Path,
        stem: &str,
        entry: AnimatedModel,
        keys: (&str, &str),
        section: &mut IniSection,
        hashes: &mut Vec<String>,
    ) -> Result<()> {
        let (model_key, anim_key) = keys;
        section.set(model_key, entry.model.label());
        let mut anims = Vec::new();
        for (k, motion) in entry.motions.into_iter().enumerate() {
            let Some(motion) = motion else { continue };
            section.set(format!("{}{}", anim_key, k + 1), motion.label.as_str());
            let name = format!("{} Anim {}.saanim", stem, k + 1);
            let bytes = AnimationFile::new(motion).to_bytes(self.no_metadata)?;
            let hash = self.batch_file(dir, &name, &bytes)?;
            hashes.push(format!("{}:{}", name, hash));
            anims.push(name);
        }
        let name = format!("{}.sa2mdl", stem);
        let bytes = ModelFile::new(entry.model, anims, None).to_bytes(self.no_metadata)?;
        let hash = self.batch_file(dir, &name, &bytes)?;
        hashes.push(format!("{}:{}", name, hash));
        Ok(())
    }

    pub(super) fn chara_object_data(&mut self, d: &Directive, address: usize) -> Result<()> {
        if d.length > CHARA_OBJECT_NAMES.len() {
            return Err(SplitError::invalid(&d.export, "length", d.length.to_string()));
        }
        self.check_table(d, address, CHARA_OBJECT_SIZE)?;
        let dir = PathBuf::from(d.require_filename()?);
        self.writer.create_dir(&dir)?;

        let mut info = IniDocument::new();
        let mut hashes = Vec::new();
        for (i, name) in CHARA_OBJECT_NAMES.iter().enumerate().take(d.length) {
            let chara = CharaObjectData::decode(&self.view, address + i * CHARA_OBJECT_SIZE)
                .in_export(&d.export)?;
            let mut s = IniSection::new(i.to_string());
            self.write_animated(&dir, name, chara.main, ("MainModel", "Animation"), &mut s, &mut hashes)?;

            if let Some(acc) = chara.accessory {
                s.set("AccessoryModel", acc.model.label());
                s.set("AccessoryAttachNode", acc.attach_node.as_str());
                let file = format!("{} Accessory.sa2mdl", name);
                let bytes = ModelFile::new(acc.model, Vec::new(), None).to_bytes(self.no_metadata)?;
                let hash = self.batch_file(&dir, &file, &bytes)?;
                hashes.push(format!("{}:{}", file, hash));
            }

            if let Some(sup) = chara.super_form {
                let stem = format!("Super {}", name);
                self.write_animated(&dir, &stem, sup, ("SuperModel", "SuperAnimation"), &mut s, &mut hashes)?;
            }

            s.set("Unknown1", chara.unknown1.to_string());
            s.set("Rating", chara.rating.to_string());
            s.set("DescriptionID", chara.description_id.to_string());
            s.set("TextBackTexture", chara.text_back_texture.to_string());
            s.set("SelectionSize", chara.selection_size.to_string());
            info.push_section(s);
        }

        let hash = self.batch_file(&dir, "info.ini", info.to_string().as_bytes())?;
        hashes.push(format!("info.ini:{}", hash));
        self.batch_item(d, &dir, hashes);
        Ok(())
    }

    pub(super) fn kart_special_info(&mut self, d: &Directive, address: usize) -> Result<()> {
        self.check_table(d, address, KART_SPECIAL_INFO_SIZE)?;
        let dir = PathBuf::from(d.require_filename()?);
        self.writer.create_dir(&dir)?;

        let mut info = IniDocument::new();
        let mut hashes = Vec::new();
        for i in 0..d.length {
            let kart = KartSpecialInfo::decode(&self.view, address + i * KART_SPECIAL_INFO_SIZE)
                .in_export(&d.export)?;
            let mut s = IniSection::new(i.to_string());
            s.set("ID", kart.id.to_string());
            s.set("Model", kart.model.label());

            let file = format!("{}.sa2mdl", i);
            let bytes = ModelFile::new(kart.model, Vec::new(), None).to_bytes(self.no_metadata)?;
            let hash = self.batch_file(&dir, &file, &bytes)?;
            hashes.push(format!("{}:{}", file, hash));

            if let Some(low) = kart.low_model {
                s.set("LowModel", low.label());
                let file = format!("{} Low.sa2mdl", i);
                let bytes = ModelFile::new(low, Vec::new(), None).to_bytes(self.no_metadata)?;
                let hash = self.batch_file(&dir, &file, &bytes)?;
                hashes.push(format!("{}:{}", file, hash));
            }

            s.set("TexList", format!("{:08X}", kart.texlist));
            s.set("Unknown1", kart.unknown[0].to_string());
            s.set("Unknown2", kart.unknown[1].to_string());
            s.set("Unknown3", kart.unknown[2].to_string());
            info.push_section(s);
        }

        let hash = self.batch_file(&dir, "info.ini", info.to_string().as_bytes())?;
        hashes.push(format!("info.ini:{}", hash));
        self.batch_item(d, &dir, hashes);
        Ok(())
    }
}
