//! Model directives and action arrays.

use std::path::PathBuf;

use tracing::debug;

use super::consolidate::ModelAnimations;
use super::Session;
use crate::assets::{AnimationFile, ModelFile};
use crate::error::{DecodeContext, Result};
use crate::manifest::ItemInfo;
use crate::ninja::{Action, Model, ModelFormat};
use crate::paths;
use crate::project::Directive;

impl Session<'_> {
    /// A single model export
    pub(super) fn model(&mut self, d: &Directive, address: usize, format: ModelFormat) -> Result<()> {
        let model = Model::decode(&self.view, address, format).in_export(&d.export)?;
        let label = model.label().to_string();
        self.queue_scalar(d, model, format, label)
    }

    /// A bare attach export, wrapped in a single node
    pub(super) fn bare_attach(&mut self, d: &Directive, address: usize, format: ModelFormat) -> Result<()> {
        let model = Model::wrap_attach(&self.view, address, format).in_export(&d.export)?;
        let label = attach_label(&model);
        self.queue_scalar(d, model, format, label)
    }

    /// Record the item and queue the model when `label` is new
    fn queue_scalar(&mut self, d: &Directive, model: Model, format: ModelFormat, label: String) -> Result<()> {
        self.manifest.add_item(ItemInfo::new(&d.export, label.as_str()));
        if self.labels.contains(&label) {
            debug!(export = %d.export, label = %label, "Model already emitted");
            return Ok(());
        }
        let file = PathBuf::from(d.require_filename()?);
        let set = model.label_set();
        self.models
            .push(ModelAnimations::new(file, d.export.as_str(), model, format));
        self.labels.claim(&set);
        Ok(())
    }

    pub(super) fn model_array(&mut self, d: &Directive, address: usize, format: ModelFormat) -> Result<()> {
        for (i, offset) in self.elements(d, address)? {
            let model = Model::decode(&self.view, offset, format).in_export(&d.export)?;
            let label = model.label().to_string();
            self.queue_element(d, i, model, format, label);
        }
        Ok(())
    }

    /// Array of bare attaches
    pub(super) fn attach_array(&mut self, d: &Directive, address: usize, format: ModelFormat) -> Result<()> {
        for (i, offset) in self.elements(d, address)? {
            let model = Model::wrap_attach(&self.view, offset, format).in_export(&d.export)?;
            let label = attach_label(&model);
            self.queue_element(d, i, model, format, label);
        }
        Ok(())
    }

    /// Record element `i` and queue it when its label is new or a
    /// `filename<i>` override asks for it
    fn queue_element(&mut self, d: &Directive, i: usize, model: Model, format: ModelFormat, label: String) {
        self.manifest
            .add_item(ItemInfo::new(&d.export, label.as_str()).at(i));
        let named = d.element_name(i);
        let seen = self.labels.contains(&label);
        if seen && named.is_none() {
            debug!(export = %d.export, index = i, label = %label, "Model already emitted");
            return;
        }
        let stem = named.map_or_else(|| paths::indexed(i), str::to_string);
        let file = paths::join_with_ext(&Self::base_dir(d), &stem, format.extension());
        if !seen {
            self.labels.claim(&model.label_set());
        }
        self.models.push(ModelAnimations::new(
            file,
            format!("{}[{}]", d.export, i),
            model,
            format,
        ));
    }

    pub(super) fn action_array(&mut self, d: &Directive, address: usize) -> Result<()> {
        let format = self.game.model_format();
        let base = Self::base_dir(d);
        for (i, offset) in self.elements(d, address)? {
            let mut action = Action::decode(&self.view, offset, format).in_export(&d.export)?;

            let decoded = action.motion.label.clone();
            let mut save = false;
            let name = match self.anim_labels.get(&decoded) {
                Some(existing) => existing.clone(),
                None => {
                    let name = format!("{}_{}", d.export, i);
                    save = !self.labels.contains(&decoded);
                    self.anim_labels.insert(decoded, name.clone());
                    name
                }
            };
            action.motion.label = name.clone();
            let model_label = action.model.label().to_string();
            self.manifest
                .add_item(ItemInfo::new(&d.export, name.as_str()).at(i).field("motion"));
            self.manifest
                .add_item(ItemInfo::new(&d.export, model_label.as_str()).at(i).field("object"));

            // `element` is where this slot's files are named after; the
            // animation itself may already live elsewhere.
            let mut element = paths::join_with_ext(&base, &paths::indexed(i), ".saanim");
            let mut anim_file = self
                .anim_files
                .get(&name)
                .cloned()
                .unwrap_or_else(|| element.clone());
            if let Some(custom) = d.element_part(i, "a") {
                element = paths::join_with_ext(&base, custom, ".saanim");
                anim_file = element.clone();
                save = true;
            }
            if save {
                let bytes = AnimationFile::new(action.motion.clone()).to_bytes(self.no_metadata)?;
                self.emit(&anim_file, "animation", &bytes)?;
                self.anim_files.entry(name.clone()).or_insert_with(|| anim_file.clone());
            }

            let anim_path = self.writer.resolve(&anim_file);
            if let Some(model_file) = self.models.get(&model_label).map(|m| m.filename.clone()) {
                let rel = paths::relative_to_file(&self.writer.resolve(&model_file), &anim_path);
                if let Some(queued) = self.models.get_mut(&model_label) {
                    queued.animations.push(rel);
                }
                continue;
            }

            let model_ext = format.extension();
            let custom_model = d.element_part(i, "m");
            let model_file = match custom_model {
                Some(custom) => paths::join_with_ext(&base, custom, model_ext),
                None => paths::change_extension(&element, model_ext),
            };
            let seen = self.labels.contains(&model_label);
            if seen && custom_model.is_none() {
                debug!(export = %d.export, index = i, label = %model_label, "Action model already emitted");
                continue;
            }
            let rel = paths::relative_to_file(&self.writer.resolve(&model_file), &anim_path);
            if !seen {
                self.labels.claim(&action.model.label_set());
            }
            let file = ModelFile::new(
                action.model,
                vec![rel],
                Some(format!("{}[{}]->object", d.export, i)),
            );
            let bytes = file.to_bytes(self.no_metadata)?;
            self.emit(&model_file, "model", &bytes)?;
        }
        Ok(())
    }
}

/// Label of the attach held by a wrapped model's root
fn attach_label(model: &Model) -> String {
    model
        .node(model.root)
        .and_then(|n| n.attach)
        .and_then(|a| model.attaches.get(a as usize))
        .map(|a| a.label().to_string())
        .unwrap_or_else(|| model.label().to_string())
}
