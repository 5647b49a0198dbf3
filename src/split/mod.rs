//! The split pipeline.
//!
//! A run loads the image, resolves its exports, then walks the project's
//! directives in file order. Each directive decodes records at its export
//! and either writes them straight away (animations, level tables, texture
//! lists, batch tables) or queues them (models) so later directives can
//! attach animations. Queued models are consolidated and written last,
//! followed by the manifest.
//!
//! Emission is order dependent: the first directive to reach a label owns
//! it, so directives are never reordered.

pub mod consolidate;
pub mod label_index;
pub mod writer;

mod characters;
mod levels;
mod models;
mod motions;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::assets::ModelFile;
use crate::cancel::{CancelToken, RunBudget};
use crate::error::{DecodeContext, Result, SplitError};
use crate::formats::pe::{self, ExportTable, LoadedImage};
use crate::hashing::HashAlgorithm;
use crate::io::{IOLimits, SourceFile};
use crate::manifest::OutputManifest;
use crate::ninja::{Game, ImageView, LandTableFormat, ModelFormat};
use crate::paths;
use crate::project::{Directive, DirectiveKind, ProjectConfig};
use crate::{log_error, span_trace};

use consolidate::ModelQueue;
use label_index::LabelIndex;
use writer::AssetWriter;

/// Run settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitOptions {
    /// Leave labels, descriptions and tool info out of asset files
    pub no_metadata: bool,
    pub hash_algorithm: HashAlgorithm,
    pub io_limits: IOLimits,
    /// Stop between directives once this many seconds have passed
    pub time_budget_secs: Option<u64>,
}

/// What a finished run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSummary {
    /// Directives processed
    pub items: usize,
    pub files_written: usize,
    pub models_emitted: usize,
    /// Queued models dropped because a later model contains them
    pub models_consolidated: usize,
    pub elapsed_secs: f64,
    pub manifest_path: PathBuf,
}

pub struct Splitter {
    options: SplitOptions,
    cancel: CancelToken,
}

impl Splitter {
    pub fn new(options: SplitOptions) -> Self {
        Self {
            options,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn options(&self) -> &SplitOptions {
        &self.options
    }

    /// Split `data_file` as described by `project_file` into `project_dir`.
    ///
    /// The manifest is written as `<data file stem>_data.ini`.
    pub fn run(&self, data_file: &Path, project_file: &Path, project_dir: &Path) -> Result<SplitSummary> {
        let source = SourceFile::open(data_file, &self.options.io_limits)?;
        let image = LoadedImage::load(source.bytes())?;
        let project = ProjectConfig::load(project_file)?;
        let stem = data_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.split(&image, &project, project_dir, &stem)
    }

    /// Split an already loaded image
    pub fn split(
        &self,
        image: &LoadedImage,
        project: &ProjectConfig,
        project_dir: &Path,
        manifest_stem: &str,
    ) -> Result<SplitSummary> {
        let started = Instant::now();
        let budget = RunBudget::from_option(self.options.time_budget_secs);
        let exports = pe::resolve_exports(image)?;
        debug!(exports = exports.count(), image_base = image.image_base(), "Resolved exports");
        std::fs::create_dir_all(project_dir).map_err(|e| SplitError::io(project_dir, e))?;

        let mut session = Session::new(image, &exports, project, project_dir, &self.options);
        for (completed, directive) in project.directives.iter().enumerate() {
            if self.cancel.is_cancelled() || budget.is_exhausted() {
                return Err(SplitError::Cancelled { completed });
            }
            let span = span_trace!("directive", export = %directive.export);
            let _guard = span.enter();
            session
                .directive(directive)
                .map_err(|e| log_error!(e, "directive failed"))?;
        }

        let items = project.directives.len();
        let (manifest, models_emitted, models_consolidated, files_written) = session.finish()?;
        let manifest_path = project_dir.join(format!("{}_data.ini", manifest_stem));
        manifest.write(&manifest_path)?;

        let elapsed_secs = started.elapsed().as_secs_f64();
        info!("Split {} items in {} seconds", items, elapsed_secs);
        Ok(SplitSummary {
            items,
            files_written,
            models_emitted,
            models_consolidated,
            elapsed_secs,
            manifest_path,
        })
    }
}

/// Mutable state of one run
pub(crate) struct Session<'a> {
    image: &'a LoadedImage,
    view: ImageView<'a>,
    exports: &'a ExportTable,
    game: Game,
    no_metadata: bool,
    writer: AssetWriter,
    labels: LabelIndex,
    /// Decoded animation label to the name it was first emitted under
    anim_labels: HashMap<String, String>,
    /// Emitted animation name to its project-relative file
    anim_files: HashMap<String, PathBuf>,
    models: ModelQueue,
    manifest: OutputManifest,
}

impl<'a> Session<'a> {
    fn new(
        image: &'a LoadedImage,
        exports: &'a ExportTable,
        project: &ProjectConfig,
        project_dir: &Path,
        options: &SplitOptions,
    ) -> Self {
        Self {
            image,
            view: ImageView::new(image.data(), image.image_base()),
            exports,
            game: project.game,
            no_metadata: options.no_metadata,
            writer: AssetWriter::new(project_dir, options.hash_algorithm),
            labels: LabelIndex::new(),
            anim_labels: HashMap::new(),
            anim_files: HashMap::new(),
            models: ModelQueue::new(),
            manifest: OutputManifest::new(project.name.as_str(), project.game.to_string()),
        }
    }

    fn directive(&mut self, d: &Directive) -> Result<()> {
        self.manifest.add_export(&d.export, &d.type_tag);
        let address = self
            .exports
            .rva(&d.export)
            .ok_or_else(|| SplitError::UnknownExport(d.export.clone()))? as usize;
        debug!(
            export = %d.export,
            va = ?self.exports.va(&d.export),
            section = ?self.image.section_name(address as u32),
            "Export resolved"
        );

        match &d.filename {
            Some(f) => info!(export = %d.export, kind = %d.type_tag, file = %f, "Splitting export"),
            None => info!(export = %d.export, kind = %d.type_tag, "Splitting export"),
        }

        let Some(kind) = d.kind else {
            warn!(export = %d.export, kind = %d.type_tag, "Unknown directive type, skipping");
            return Ok(());
        };
        if kind.is_pointer_array() {
            self.check_table(d, address, 4)?;
        }

        let model_format = self.game.model_format();
        let land_format = self.game.land_format();
        let basic_format = self.basic_format();
        match kind {
            DirectiveKind::LandTable => self.land_table(d, address, land_format),
            DirectiveKind::BattleLandTable => self.land_table(d, address, LandTableFormat::Sa2b),
            DirectiveKind::LandTableArray => self.land_table_array(d, address, land_format),
            DirectiveKind::Model => self.model(d, address, model_format),
            DirectiveKind::BasicModel => self.model(d, address, ModelFormat::Basic),
            DirectiveKind::BasicDxModel => self.model(d, address, ModelFormat::BasicDx),
            DirectiveKind::ChunkModel => self.model(d, address, ModelFormat::Chunk),
            DirectiveKind::GcModel => self.model(d, address, ModelFormat::Gc),
            DirectiveKind::Morph => self.bare_attach(d, address, basic_format),
            DirectiveKind::ChunkAttach => self.bare_attach(d, address, ModelFormat::Chunk),
            DirectiveKind::ModelArray => self.model_array(d, address, model_format),
            DirectiveKind::BasicModelArray => self.model_array(d, address, ModelFormat::Basic),
            DirectiveKind::BasicDxModelArray => self.model_array(d, address, ModelFormat::BasicDx),
            DirectiveKind::ChunkModelArray => self.model_array(d, address, ModelFormat::Chunk),
            DirectiveKind::GcModelArray => self.model_array(d, address, ModelFormat::Gc),
            DirectiveKind::ModelsArray => self.attach_array(d, address, basic_format),
            DirectiveKind::ActionArray => self.action_array(d, address),
            DirectiveKind::Motion => self.motion(d, address),
            DirectiveKind::MotionArray => self.motion_array(d, address),
            DirectiveKind::TexList => self.texlist(d, address),
            DirectiveKind::TexListArray => self.texlist_array(d, address),
            DirectiveKind::AnimIndexList => self.anim_index_list(d, address),
            DirectiveKind::CharaObjectDataList => self.chara_object_data(d, address),
            DirectiveKind::KartSpecialInfoList => self.kart_special_info(d, address),
            DirectiveKind::MotionTable => self.motion_table(d, address, false),
            DirectiveKind::ChaoMotionTable => self.motion_table(d, address, true),
            DirectiveKind::CActionArray => self.camera_action_array(d, address),
        }
    }

    /// Basic geometry flavour for bare attaches in this game
    fn basic_format(&self) -> ModelFormat {
        match self.game {
            Game::Sadx => ModelFormat::BasicDx,
            Game::Sa2b => ModelFormat::Basic,
        }
    }

    /// Fail with an invalid `length` when `length` records of `stride`
    /// bytes at `address` would run past the end of the image
    fn check_table(&self, d: &Directive, address: usize, stride: usize) -> Result<()> {
        let end = d
            .length
            .checked_mul(stride)
            .and_then(|size| address.checked_add(size));
        match end {
            Some(end) if end <= self.view.data().len() => Ok(()),
            _ => Err(SplitError::invalid(&d.export, "length", d.length.to_string())),
        }
    }

    /// Non-null elements of a pointer array as `(index, offset)` pairs.
    /// The table bounds are checked before dispatch.
    fn elements(&self, d: &Directive, address: usize) -> Result<Vec<(usize, usize)>> {
        let mut out = Vec::new();
        for i in 0..d.length {
            match self.view.pointer(address + i * 4).in_export(&d.export)? {
                Some(offset) => out.push((i, offset)),
                None => debug!(export = %d.export, index = i, "Null element, skipping"),
            }
        }
        Ok(out)
    }

    /// Output folder of an array directive; the project root when unset
    fn base_dir(d: &Directive) -> PathBuf {
        PathBuf::from(d.filename.as_deref().unwrap_or(""))
    }

    /// Write a file and record it in the manifest
    fn emit(&mut self, rel: &Path, file_type: &str, bytes: &[u8]) -> Result<()> {
        let hash = self.writer.write(rel, bytes)?;
        self.manifest.add_file(paths::manifest_key(rel), file_type, hash);
        Ok(())
    }

    /// Consolidate and write queued models. Returns the manifest, models
    /// written, models dropped and the total number of files written.
    fn finish(mut self) -> Result<(OutputManifest, usize, usize, usize)> {
        let queue = std::mem::take(&mut self.models);
        let (survivors, dropped) = queue.consolidate();
        let emitted = survivors.len();
        for entry in survivors {
            let file = ModelFile::new(entry.model, entry.animations, Some(entry.name));
            let bytes = file.to_bytes(self.no_metadata)?;
            self.emit(&entry.filename, entry.format.type_tag(), &bytes)?;
        }
        debug!(emitted, dropped, labels = self.labels.len(), "Models consolidated");
        let files = self.writer.files_written();
        Ok((self.manifest, emitted, dropped, files))
    }
}
