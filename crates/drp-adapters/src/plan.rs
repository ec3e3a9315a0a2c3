//! Plan estándar del DRP: ingesta, procesado por exposición, sky map y el
//! bucle de coadds por patch.

use std::path::PathBuf;
use std::sync::Arc;

use drp_core::{PipelineError, StageDefinition, StagePhase, StagePlan};
use drp_domain::Dimension;

use crate::command::{CommandBuilder, ExtraSelectors, StageTemplate, Versions};
use crate::stages::CmdLineStage;

const PATCH_FILTER: [Dimension; 3] = [Dimension::Tract, Dimension::Patch, Dimension::Filter];

/// Las nueve etapas en orden de dependencias.
pub fn standard_templates() -> Vec<StageTemplate> {
    let coadd = |name: &str, phase| {
        StageTemplate::new(name, phase).dimensions(&PATCH_FILTER)
                                       .versions(Versions::Skip)
    };
    vec![StageTemplate::new("ingestSimImages", StagePhase::Ingest).ingest(),
         StageTemplate::new("processEimage", StagePhase::PerExposureProcessing).dimensions(&[Dimension::Visit,
                                                                                               Dimension::Raft])
                                                                                .config_file("processEimage.py"),
         StageTemplate::new("makeDiscreteSkyMap", StagePhase::SkyMapBuild).config_file("makeDiscreteSkyMap_deep.py"),
         coadd("makeCoaddTempExp", StagePhase::CoaddTempExp).select_filter()
                                                            .config_file("makeCoaddTempExp_deep.py"),
         coadd("assembleCoadd", StagePhase::AssembleCoadd).select_filter()
                                                          .config_file("assembleCoadd_deep.py"),
         coadd("detectCoaddSources", StagePhase::DetectSources),
         coadd("mergeCoaddDetections", StagePhase::MergeDetections),
         coadd("measureCoaddSources", StagePhase::MeasureSources),
         coadd("mergeCoaddMeasurements", StagePhase::MergeMeasurements)]
}

/// Plan completo. `image_pattern` es el glob de imágenes que recibe la ingesta
/// (se pasa sin expandir; lo expande la herramienta).
pub fn standard_plan(image_pattern: &str, config_dir: impl Into<PathBuf>) -> Result<StagePlan, PipelineError> {
    let builder = CommandBuilder::new(config_dir);
    let stages = standard_templates().into_iter()
                                     .map(|template| {
                                         let extra = if template.ingest {
                                             ExtraSelectors::positional([image_pattern])
                                         } else {
                                             ExtraSelectors::none()
                                         };
                                         Arc::new(CmdLineStage::new(template, builder.clone()).with_extra(extra))
                                             as Arc<dyn StageDefinition>
                                     })
                                     .collect();
    StagePlan::new(stages)
}
