pub mod quant_input;

pub use quant_input::{
    InputFormat,
    QuantInput,
};
