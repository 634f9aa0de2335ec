//! Host records for the end-to-end suite
//!
//! The build script generates validation code for these types from
//! `fixtures/records.json`; each locale's unit lives in its own module.

#[derive(Debug, Clone, Default)]
pub struct User {
    pub id: i64,
    pub id2: i32,
    pub id3: i32,
    pub id4: i32,
    pub id5: String,
    pub id6: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct Applicant {
    pub id: i64,
    pub name: String,
    pub nick: String,
    pub score: f64,
    pub code: String,
}

#[derive(Debug, Clone, Default)]
pub struct Pair {
    pub id: i64,
    pub id3: i64,
}

#[derive(Debug, Clone, Default)]
pub struct Types {
    pub int: isize,
    pub int8: i8,
    pub int16: i16,
    pub int32: i32,
    pub int64: i64,
    pub uint8: u8,
    pub uint16: u16,
    pub uint32: u32,
    pub uint64: u64,
    pub float32: f32,
    pub float64: f64,
    pub string: String,
    pub boolean: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Ident {
    pub id: String,
}

#[derive(Debug, Clone, Default)]
pub struct Embedded {
    pub ident: Ident,
    pub flag: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Notice {
    pub contact: String,
    pub channel: String,
    pub reason: String,
    pub urgent: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Gauge {
    pub ratio: f32,
}

pub mod en {
    use super::*;

    include!(concat!(env!("OUT_DIR"), "/records_en.rs"));
}

pub mod fr {
    use super::*;

    include!(concat!(env!("OUT_DIR"), "/records_fr.rs"));
}
