pub mod paragraph_amrs;
