//! Motion directives: single motions, motion arrays, index lists, motion
//! tables and camera actions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::Session;
use crate::assets::AnimationFile;
use crate::error::{DecodeContext, Result, SplitError};
use crate::formats::ini::{IniDocument, IniSection};
use crate::manifest::{DataItem, ItemInfo};
use crate::ninja::tables::{read_anim_index_list, MotionTableEntry, MOTION_TABLE_ENTRY_SIZE};
use crate::ninja::{Camera, Motion};
use crate::paths;
use crate::project::Directive;

impl Session<'_> {
    /// Rename a decoded motion to `name` on first sight. Returns the name
    /// it is emitted under and whether this is the first sight.
    fn claim_motion(&mut self, motion: &mut Motion, name: String) -> (String, bool) {
        match self.anim_labels.get(&motion.label) {
            Some(existing) => {
                debug!(label = %motion.label, name = %existing, "Motion already named");
                motion.label = existing.clone();
                (existing.clone(), false)
            }
            None => {
                self.anim_labels.insert(motion.label.clone(), name.clone());
                motion.label = name.clone();
                (name, true)
            }
        }
    }

    fn save_motion(&mut self, motion: &Motion, file: &Path) -> Result<()> {
        let bytes = AnimationFile::new(motion.clone()).to_bytes(self.no_metadata)?;
        self.emit(file, "animation", &bytes)?;
        self.anim_files
            .entry(motion.label.clone())
            .or_insert_with(|| file.to_path_buf());
        Ok(())
    }

    pub(super) fn motion(&mut self, d: &Directive, address: usize) -> Result<()> {
        let nodes = d.node_count()?;
        let mut motion = Motion::decode(&self.view, address, nodes, false).in_export(&d.export)?;
        let (name, first) = self.claim_motion(&mut motion, d.export.clone());
        self.manifest.add_item(ItemInfo::new(&d.export, name.as_str()));
        if first {
            let file = PathBuf::from(d.require_filename()?);
            self.save_motion(&motion, &file)?;
        }
        Ok(())
    }

    pub(super) fn motion_array(&mut self, d: &Directive, address: usize) -> Result<()> {
        let counts = d.node_counts()?;
        let base = Self::base_dir(d);
        for (i, offset) in self.elements(d, address)? {
            let nodes = *counts.get(i).ok_or_else(|| {
                SplitError::invalid(
                    &d.export,
                    "nodecounts",
                    format!("{} entries for element {}", counts.len(), i),
                )
            })?;
            let mut motion = Motion::decode(&self.view, offset, nodes, false).in_export(&d.export)?;
            let (name, first) = self.claim_motion(&mut motion, format!("{}_{}", d.export, i));
            self.manifest
                .add_item(ItemInfo::new(&d.export, name.as_str()).at(i));
            if first {
                let stem = d
                    .element_name(i)
                    .map_or_else(|| paths::indexed(i), str::to_string);
                self.save_motion(&motion, &paths::join_with_ext(&base, &stem, ".saanim"))?;
            }
        }
        Ok(())
    }

    /// Write one file of a batch directive; returns its hash
    pub(super) fn batch_file(&mut self, dir: &Path, name: &str, bytes: &[u8]) -> Result<String> {
        self.writer.write(&dir.join(name), bytes)
    }

    /// Record the aggregate item of a batch directive
    pub(super) fn batch_item(&mut self, d: &Directive, dir: &Path, hashes: Vec<String>) {
        self.manifest.add_data_item(DataItem {
            data_type: d.type_tag.clone(),
            export: d.export.clone(),
            filename: paths::manifest_key(dir),
            hash: hashes.join("|"),
        });
    }

    /// Motions listed until an index of -1
    pub(super) fn anim_index_list(&mut self, d: &Directive, address: usize) -> Result<()> {
        let dir = PathBuf::from(d.require_filename()?);
        self.writer.create_dir(&dir)?;
        let list = read_anim_index_list(&self.view, address).in_export(&d.export)?;
        let mut hashes = Vec::with_capacity(list.len());
        for entry in list {
            let nodes = entry.node_count.max(0) as usize;
            let motion = Motion::decode(&self.view, entry.motion, nodes, false).in_export(&d.export)?;
            let bytes = AnimationFile::new(motion).to_bytes(self.no_metadata)?;
            let name = format!("{:03}.saanim", entry.index);
            let hash = self.batch_file(&dir, &name, &bytes)?;
            hashes.push(format!("{}:{}", entry.index, hash));
        }
        self.batch_item(d, &dir, hashes);
        Ok(())
    }

    /// Motion table rows plus an `info.ini` describing them. Rows sharing
    /// a motion reference the first row's file.
    pub(super) fn motion_table(&mut self, d: &Directive, address: usize, short_rot: bool) -> Result<()> {
        self.check_table(d, address, MOTION_TABLE_ENTRY_SIZE)?;
        let dir = PathBuf::from(d.require_filename()?);
        let nodes = d.node_count()?;
        self.writer.create_dir(&dir)?;

        let mut decoded: HashMap<usize, String> = HashMap::new();
        let mut hashes = Vec::new();
        let mut info = IniDocument::new();
        for i in 0..d.length {
            let row = MotionTableEntry::read(&self.view, address + i * MOTION_TABLE_ENTRY_SIZE)
                .in_export(&d.export)?;
            let label = match decoded.get(&row.motion) {
                Some(l) => l.clone(),
                None => {
                    let motion = Motion::decode(&self.view, row.motion, nodes, short_rot)
                        .in_export(&d.export)?;
                    let label = motion.label.clone();
                    let name = format!("{}.saanim", i);
                    let bytes = AnimationFile::new(motion).to_bytes(self.no_metadata)?;
                    let hash = self.batch_file(&dir, &name, &bytes)?;
                    hashes.push(format!("{}:{}", name, hash));
                    decoded.insert(row.motion, label.clone());
                    label
                }
            };

            let mut s = IniSection::new(i.to_string());
            s.set("Motion", label);
            s.set("LoopProperty", row.loop_property.to_string());
            s.set("Pose", row.pose.to_string());
            s.set("NextAnimation", row.next_animation.to_string());
            s.set("TransitionSpeed", row.transition_speed.to_string());
            s.set("StartFrame", row.start_frame.to_string());
            s.set("EndFrame", row.end_frame.to_string());
            s.set("PlaySpeed", row.play_speed.to_string());
            info.push_section(s);
        }

        let hash = self.batch_file(&dir, "info.ini", info.to_string().as_bytes())?;
        hashes.push(format!("info.ini:{}", hash));
        self.batch_item(d, &dir, hashes);
        Ok(())
    }

    /// Array of camera actions: a camera plus a single-node motion each
    pub(super) fn camera_action_array(&mut self, d: &Directive, address: usize) -> Result<()> {
        let base = Self::base_dir(d);
        for (i, offset) in self.elements(d, address)? {
            if let Some(cam) = self.view.pointer(offset).in_export(&d.export)? {
                let camera = Camera::decode(&self.view, cam).in_export(&d.export)?;
                let stem = d
                    .element_part(i, "c")
                    .map_or_else(|| i.to_string(), str::to_string);
                let file = paths::join_with_ext(&base, &stem, ".ini");
                self.emit(&file, "camera", camera.to_ini().to_string().as_bytes())?;
            }
            if let Some(mot) = self.view.pointer(offset + 4).in_export(&d.export)? {
                let motion = Motion::decode(&self.view, mot, 1, false).in_export(&d.export)?;
                let stem = d
                    .element_part(i, "m")
                    .map_or_else(|| paths::indexed(i), str::to_string);
                let file = paths::join_with_ext(&base, &stem, ".saanim");
                let bytes = AnimationFile::new(motion).to_bytes(self.no_metadata)?;
                self.emit(&file, "animation", &bytes)?;
            }
        }
        Ok(())
    }
}
