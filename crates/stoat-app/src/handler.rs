//! Coordinator message handling

use stoat_core::prelude::*;
use stoat_core::DeployStage;
use stoat_engine::EngineApi;

use crate::deploy::Deployer;
use crate::message::Message;
use crate::status::BannerSink;

/// Whether the coordinator loop keeps running after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Shutdown,
}

fn deploy_banner(stage: DeployStage) -> &'static str {
    match stage {
        DeployStage::Start => "Deployment started",
        DeployStage::Success => "Deployment finished",
        DeployStage::Failure => "Deployment failed",
    }
}

/// Apply one message to the deployer and banner sink.
pub fn update<E: EngineApi>(
    deployer: &mut Deployer<E>,
    banner: &mut dyn BannerSink,
    message: Message,
) -> Flow {
    match message {
        Message::DeployStatus(stage) => {
            info!("Deploy stage reported: {:?}", stage);
            banner.post(deploy_banner(stage), None);
        }
        Message::SchemaChanged { schema_id, name } => {
            debug!("Schema changed to {} ({})", schema_id, name);
            deployer.update_status(&name, &name);
            deployer.load_settings_for(&schema_id);
        }
        Message::StatusUpdate { long, short } => {
            deployer.update_status(&long, &short);
        }
        Message::ReloadRequested => {
            info!("Reload requested");
            if !deployer.deploy(true) {
                warn!("Redeploy did not complete cleanly");
            }
        }
        Message::SyncRequested => {
            deployer.sync_user_data();
        }
        Message::PowerOff => {
            info!("Power-off reported; taking engine offline");
            deployer.shutdown();
            return Flow::Shutdown;
        }
        Message::Terminate => {
            info!("Termination requested; releasing sessions");
            deployer.cleanup_sessions();
            deployer.shutdown();
            return Flow::Shutdown;
        }
    }
    Flow::Continue
}
