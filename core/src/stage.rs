//! Standard pipeline progress stages
//!
//! A shared vocabulary for `transactionStatus`, so stages across a pipeline
//! report progress with the same names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStage {
    Milestone,
    Read,
    Validate,
    Enrich,
    Write,
    Xform,
    ReadSrc,
    XformCdm,
    XformTgt,
    EnrSrc,
    EnrTgt,
    PutCache,
    GetCache,
    PubEvt,
    PubInt,
    RecvEvt,
    RecvInt,
    WriteMrk,
    WriteTgt,
    AckInt,
    AckEvt,
}

impl ProgressStage {
    pub const ALL: [ProgressStage; 21] = [
        ProgressStage::Milestone,
        ProgressStage::Read,
        ProgressStage::Validate,
        ProgressStage::Enrich,
        ProgressStage::Write,
        ProgressStage::Xform,
        ProgressStage::ReadSrc,
        ProgressStage::XformCdm,
        ProgressStage::XformTgt,
        ProgressStage::EnrSrc,
        ProgressStage::EnrTgt,
        ProgressStage::PutCache,
        ProgressStage::GetCache,
        ProgressStage::PubEvt,
        ProgressStage::PubInt,
        ProgressStage::RecvEvt,
        ProgressStage::RecvInt,
        ProgressStage::WriteMrk,
        ProgressStage::WriteTgt,
        ProgressStage::AckInt,
        ProgressStage::AckEvt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStage::Milestone => "MILESTONE",
            ProgressStage::Read => "READ",
            ProgressStage::Validate => "VALIDATE",
            ProgressStage::Enrich => "ENRICH",
            ProgressStage::Write => "WRITE",
            ProgressStage::Xform => "XFORM",
            ProgressStage::ReadSrc => "READ_SRC",
            ProgressStage::XformCdm => "XFORM_CDM",
            ProgressStage::XformTgt => "XFORM_TGT",
            ProgressStage::EnrSrc => "ENR_SRC",
            ProgressStage::EnrTgt => "ENR_TGT",
            ProgressStage::PutCache => "PUT_CACHE",
            ProgressStage::GetCache => "GET_CACHE",
            ProgressStage::PubEvt => "PUB_EVT",
            ProgressStage::PubInt => "PUB_INT",
            ProgressStage::RecvEvt => "RECV_EVT",
            ProgressStage::RecvInt => "RECV_INT",
            ProgressStage::WriteMrk => "WRITE_MRK",
            ProgressStage::WriteTgt => "WRITE_TGT",
            ProgressStage::AckInt => "ACK_INT",
            ProgressStage::AckEvt => "ACK_EVT",
        }
    }
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ProgressStage> for String {
    fn from(stage: ProgressStage) -> Self {
        stage.as_str().to_string()
    }
}

/// Unrecognized progress stage name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown progress stage: {0}")]
pub struct UnknownStage(pub String);

impl FromStr for ProgressStage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProgressStage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}
