//! The publish workflow aggregate
//!
//! Owns the draft and the pipeline state, and is the only place either is
//! mutated. Each trigger checks its guard and performs the start transition
//! under the lock, then releases the lock for the remote call and applies the
//! completion transition afterwards. Completions from before a `reset()` are
//! recognised by their epoch and dropped.

use std::sync::{Mutex, MutexGuard};

use mintflow_common::{AssetFields, ContentRef, PipelineStage, StateError};
use mintflow_ledger::{AssetPublisher, MintError, MintedAsset, Signer};
use mintflow_pinning::{
    preview, ContentUploader, ImageBlob, ImagePreview, ImageUploadResult, MetadataPublisher,
    MetadataUploadResult, PreviewError, UploadError,
};

use crate::domain::entities::{AssetDraft, PublishSnapshot, StageFlags};
use crate::domain::state::{PublishEvent, PublishState, PublishStateMachine};

#[derive(Debug, Default)]
struct Inner {
    state: PublishState,
    draft: AssetDraft,
    metadata: Option<MetadataUploadResult>,
    minted: Option<MintedAsset>,
    preview: Option<ImagePreview>,
    preview_error: Option<PreviewError>,
    in_flight: StageFlags,
    epoch: u64,
}

impl Inner {
    fn apply(&mut self, event: PublishEvent) -> Result<(), StateError> {
        let next = PublishStateMachine::transition(&self.state, event)?;
        tracing::debug!(from = %self.state, to = %next, "Publish state transition");
        self.state = next;
        Ok(())
    }

    /// Apply a completion event. The start transition already succeeded, so
    /// a rejection here means the state moved underneath us.
    fn complete(&mut self, event: PublishEvent) {
        if let Err(e) = self.apply(event) {
            tracing::error!(state = %self.state, error = %e, "Completion rejected by state machine");
        }
    }

    fn metadata_ref(&self) -> Option<&ContentRef> {
        self.metadata.as_ref().map(|m| &m.metadata_ref)
    }

    fn check_image_trigger(&self) -> Result<(), StateError> {
        if self.in_flight.any() {
            return Err(StateError::GuardFailed(
                "A pipeline stage is in flight".to_string(),
            ));
        }
        self.check_transition(PublishEvent::StartImageUpload)
    }

    fn check_metadata_trigger(&self) -> Result<(), StateError> {
        if self.in_flight.metadata {
            return Err(StateError::GuardFailed(
                "Metadata upload already in flight".to_string(),
            ));
        }
        if self.in_flight.image {
            return Err(StateError::GuardFailed(
                "Image upload still in flight".to_string(),
            ));
        }
        if self.in_flight.mint {
            return Err(StateError::GuardFailed("Mint in flight".to_string()));
        }
        if self.draft.image_ref.is_none() {
            return Err(StateError::GuardFailed(
                "No uploaded image to reference".to_string(),
            ));
        }
        self.check_transition(PublishEvent::StartMetadataUpload)
    }

    fn check_mint_trigger(&self) -> Result<(), StateError> {
        if self.in_flight.mint {
            return Err(StateError::GuardFailed("Mint already in flight".to_string()));
        }
        if self.in_flight.any() {
            return Err(StateError::GuardFailed(
                "An upload is still in flight".to_string(),
            ));
        }
        if self.draft.image_ref.is_none() || self.metadata.is_none() {
            return Err(StateError::GuardFailed(
                "Image and metadata must be uploaded before minting".to_string(),
            ));
        }
        self.check_transition(PublishEvent::StartMint)
    }

    fn check_transition(&self, event: PublishEvent) -> Result<(), StateError> {
        PublishStateMachine::transition(&self.state, event).map(|_| ())
    }

    fn snapshot(&self) -> PublishSnapshot {
        PublishSnapshot {
            state: self.state.clone(),
            fields: self.draft.fields.clone(),
            image_file_name: self.draft.image.as_ref().map(|b| b.file_name.clone()),
            image_ref: self.draft.image_ref.clone(),
            metadata_ref: self.metadata_ref().cloned(),
            preview: self.preview.clone(),
            preview_error: self.preview_error.as_ref().map(|e| e.to_string()),
            minted: self.minted.clone(),
            in_flight: self.in_flight,
            can_upload_metadata: self.check_metadata_trigger().is_ok(),
            can_mint: self.check_mint_trigger().is_ok(),
        }
    }
}

/// Composes image upload, metadata upload and mint in strict order
pub struct PublishWorkflow {
    uploader: ContentUploader,
    metadata: MetadataPublisher,
    assets: AssetPublisher,
    inner: Mutex<Inner>,
}

impl PublishWorkflow {
    pub fn new(
        uploader: ContentUploader,
        metadata: MetadataPublisher,
        assets: AssetPublisher,
    ) -> Self {
        Self {
            uploader,
            metadata,
            assets,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> PublishSnapshot {
        self.lock().snapshot()
    }

    pub fn state(&self) -> PublishState {
        self.lock().state.clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.lock().draft.fields.name = name.into();
    }

    pub fn set_symbol(&self, symbol: impl Into<String>) {
        self.lock().draft.fields.symbol = symbol.into();
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.lock().draft.fields.description = description.into();
    }

    pub fn set_fields(&self, fields: AssetFields) {
        self.lock().draft.fields = fields;
    }

    /// Select a new image: upload it and render its preview concurrently.
    ///
    /// References derived from a previously selected image are dropped.
    /// Returns the state after the upload settles.
    pub async fn select_image(&self, blob: ImageBlob) -> Result<PublishState, StateError> {
        let epoch = {
            let mut inner = self.lock();
            inner.check_image_trigger().inspect_err(log_ignored)?;
            inner.apply(PublishEvent::StartImageUpload)?;
            inner.draft.select_image(blob.clone());
            inner.metadata = None;
            inner.preview = None;
            inner.preview_error = None;
            inner.in_flight.set(PipelineStage::Image, true);
            inner.epoch
        };

        tracing::info!(
            file_name = %blob.file_name,
            media_type = %blob.media_type,
            size = blob.bytes.len(),
            "Image selected"
        );

        let preview_task = async {
            let result = preview::render_async(blob.bytes.clone()).await;
            self.complete_preview(epoch, result);
        };
        let upload_task = async {
            let result = self.uploader.upload(&blob).await;
            self.complete_image(epoch, result)
        };

        let ((), state) = tokio::join!(preview_task, upload_task);
        Ok(state)
    }

    /// Re-send the selected image without touching its preview
    pub async fn upload_image(&self) -> Result<PublishState, StateError> {
        let (blob, epoch) = {
            let mut inner = self.lock();
            inner.check_image_trigger().inspect_err(log_ignored)?;
            let blob = inner.draft.image.clone().ok_or_else(|| {
                StateError::GuardFailed("No image selected".to_string())
            })?;
            inner.apply(PublishEvent::StartImageUpload)?;
            inner.draft.image_ref = None;
            inner.metadata = None;
            inner.in_flight.set(PipelineStage::Image, true);
            (blob, inner.epoch)
        };

        let result = self.uploader.upload(&blob).await;
        Ok(self.complete_image(epoch, result))
    }

    /// Pin the metadata document built from the current fields and image ref
    pub async fn upload_metadata(&self) -> Result<PublishState, StateError> {
        let (fields, image_ref, epoch) = {
            let mut inner = self.lock();
            inner.check_metadata_trigger().inspect_err(log_ignored)?;
            let image_ref = inner.draft.image_ref.clone().ok_or_else(|| {
                StateError::GuardFailed("No uploaded image to reference".to_string())
            })?;
            inner.apply(PublishEvent::StartMetadataUpload)?;
            inner.metadata = None;
            inner.in_flight.set(PipelineStage::Metadata, true);
            (inner.draft.fields.clone(), image_ref, inner.epoch)
        };

        let result = self.metadata.publish(&fields, &image_ref).await;
        Ok(self.complete_metadata(epoch, result))
    }

    /// Mint the asset described by the pinned metadata.
    ///
    /// The on-chain name and symbol come from the pinned document, not from
    /// fields edited since.
    pub async fn mint(&self, signer: Option<&dyn Signer>) -> Result<PublishState, StateError> {
        let (metadata, epoch) = {
            let mut inner = self.lock();
            inner.check_mint_trigger().inspect_err(log_ignored)?;
            let metadata = inner.metadata.clone().ok_or_else(|| {
                StateError::GuardFailed("No uploaded metadata to reference".to_string())
            })?;
            inner.apply(PublishEvent::StartMint)?;
            inner.in_flight.set(PipelineStage::Mint, true);
            (metadata, inner.epoch)
        };

        let fields = AssetFields::new(
            metadata.document.name,
            metadata.document.symbol,
            metadata.document.description,
        );
        let result = self
            .assets
            .mint(signer, &metadata.metadata_ref, &fields)
            .await;
        Ok(self.complete_mint(epoch, result))
    }

    /// Re-trigger the failed stage with the results retained from earlier stages
    pub async fn retry(&self, signer: Option<&dyn Signer>) -> Result<PublishState, StateError> {
        let failed = self.lock().state.failed_stage();
        match failed {
            Some(PipelineStage::Image) => self.upload_image().await,
            Some(PipelineStage::Metadata) => self.upload_metadata().await,
            Some(PipelineStage::Mint) => self.mint(signer).await,
            None => Err(StateError::GuardFailed("No failed stage to retry".to_string())),
        }
    }

    /// Discard the draft and return to `Idle`. Calls still in flight are
    /// abandoned and their results dropped when they arrive.
    pub fn reset(&self) {
        let mut inner = self.lock();
        let epoch = inner.epoch.wrapping_add(1);
        let abandoned = inner.state.in_flight_stage();
        let state = std::mem::take(&mut inner.state);
        *inner = Inner {
            state,
            epoch,
            ..Inner::default()
        };
        inner.complete(PublishEvent::Reset);
        tracing::info!(epoch, abandoned = ?abandoned, "Publish workflow reset");
    }

    fn complete_preview(&self, epoch: u64, result: Result<ImagePreview, PreviewError>) {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            tracing::debug!(epoch, "Discarding stale preview");
            return;
        }
        match result {
            Ok(preview) => {
                tracing::debug!(
                    width = preview.width,
                    height = preview.height,
                    "Preview rendered"
                );
                inner.preview = Some(preview);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Preview unavailable");
                inner.preview_error = Some(e);
            }
        }
    }

    fn complete_image(
        &self,
        epoch: u64,
        result: Result<ImageUploadResult, UploadError>,
    ) -> PublishState {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            tracing::debug!(epoch, stage = %PipelineStage::Image, "Discarding stale completion");
            return inner.state.clone();
        }

        inner.in_flight.set(PipelineStage::Image, false);
        match result {
            Ok(upload) => {
                inner.draft.image_ref = Some(upload.content_ref);
                inner.complete(PublishEvent::ImageUploaded);
            }
            Err(e) => {
                tracing::warn!(stage = %e.stage, error = %e.cause, "Image upload failed");
                inner.complete(PublishEvent::ImageUploadFailed(e.cause.to_string()));
            }
        }
        inner.state.clone()
    }

    fn complete_metadata(
        &self,
        epoch: u64,
        result: Result<MetadataUploadResult, UploadError>,
    ) -> PublishState {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            tracing::debug!(epoch, stage = %PipelineStage::Metadata, "Discarding stale completion");
            return inner.state.clone();
        }

        inner.in_flight.set(PipelineStage::Metadata, false);
        match result {
            Ok(upload) => {
                inner.metadata = Some(upload);
                inner.complete(PublishEvent::MetadataUploaded);
            }
            Err(e) => {
                tracing::warn!(stage = %e.stage, error = %e.cause, "Metadata upload failed");
                inner.complete(PublishEvent::MetadataUploadFailed(e.cause.to_string()));
            }
        }
        inner.state.clone()
    }

    fn complete_mint(&self, epoch: u64, result: Result<MintedAsset, MintError>) -> PublishState {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            tracing::debug!(epoch, stage = %PipelineStage::Mint, "Discarding stale completion");
            return inner.state.clone();
        }

        inner.in_flight.set(PipelineStage::Mint, false);
        match result {
            Ok(minted) => {
                inner.minted = Some(minted);
                inner.draft = AssetDraft::default();
                inner.metadata = None;
                inner.preview = None;
                inner.preview_error = None;
                inner.complete(PublishEvent::MintSucceeded);
            }
            Err(e) => {
                tracing::warn!(stage = %PipelineStage::Mint, error = %e, "Mint failed");
                inner.complete(PublishEvent::MintFailed(e.to_string()));
            }
        }
        inner.state.clone()
    }
}

fn log_ignored(e: &StateError) {
    tracing::debug!(reason = %e, "Trigger ignored");
}
