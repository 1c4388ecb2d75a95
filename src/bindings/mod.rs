pub mod request;

pub use request::{
    handle, handle_batch, handle_simultaneous, EdgeDto, GraphDto, InferenceRequest, InferenceResponse,
    SimultaneousRequest, SimultaneousResponse, Table,
};
