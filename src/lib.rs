// Library exports for peakdb
pub mod activity;
pub mod activity_table;
pub mod assay;
pub mod bed;
pub mod genome;
pub mod merge;
pub mod one_hot;
pub mod partition;
pub mod peak;
pub mod peak_id;
pub mod pipeline;
pub mod snp;
pub mod snp_seq;
pub mod window;
