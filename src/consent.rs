//! Parsing of IAB TCF v2 consent strings.
//!
//! Only the core segment is read: the part before the first `.`. Publisher
//! and disclosed-vendor segments are ignored.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::error::Error;

const TCF_VERSION: u32 = 2;

// bit offsets into the core segment
const PURPOSES_CONSENT_OFFSET: usize = 152;
const PURPOSES_CONSENT_BITS: usize = 24;
const MAX_VENDOR_ID_OFFSET: usize = 213;

/// Purposes that must be consented to for personalized ads: storage access
/// and personalized ad selection.
const PERSONALIZED_ADS_PURPOSES: [u32; 2] = [1, 4];

const CONSENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Returns whether the consent string allows personalized ads by the given
/// vendor.
#[tracing::instrument(skip(token))]
pub fn check_consent(token: &str, vendor_id: u32) -> Result<bool, Error> {
    let consent = ConsentString::parse(token)?;

    if !PERSONALIZED_ADS_PURPOSES
        .iter()
        .all(|purpose| consent.purpose_allowed(*purpose))
    {
        return Ok(false);
    }

    Ok(consent.vendor_allowed(vendor_id))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsentString {
    purposes_consent: u32,
    vendor_consents: VendorConsents,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum VendorConsents {
    BitField(Vec<bool>),
    Ranges(Vec<(u32, u32)>),
}

impl ConsentString {
    pub fn parse(token: &str) -> Result<ConsentString, Error> {
        let core = token.split('.').next().unwrap_or_default();
        let bytes = CONSENT_ENGINE
            .decode(core)
            .map_err(|err| invalid(format!("invalid base64: {}", err)))?;
        let mut reader = BitReader::new(&bytes);

        let version = reader.read_int(6)?;
        if version != TCF_VERSION {
            return Err(invalid(format!("unsupported version {}", version)));
        }

        reader.seek(PURPOSES_CONSENT_OFFSET);
        let purposes_consent = reader.read_int(PURPOSES_CONSENT_BITS)?;

        reader.seek(MAX_VENDOR_ID_OFFSET);
        let max_vendor_id = reader.read_int(16)?;
        let is_range_encoding = reader.read_bool()?;

        let vendor_consents = if is_range_encoding {
            let num_entries = reader.read_int(12)?;
            let mut ranges = Vec::with_capacity(num_entries as usize);
            for _ in 0..num_entries {
                let is_a_range = reader.read_bool()?;
                let start = reader.read_int(16)?;
                let end = if is_a_range {
                    reader.read_int(16)?
                } else {
                    start
                };
                ranges.push((start, end));
            }
            VendorConsents::Ranges(ranges)
        } else {
            let bits = (0..max_vendor_id)
                .map(|_| reader.read_bool())
                .collect::<Result<_, _>>()?;
            VendorConsents::BitField(bits)
        };

        Ok(ConsentString {
            purposes_consent,
            vendor_consents,
        })
    }

    /// Purposes are numbered from 1.
    pub fn purpose_allowed(&self, purpose: u32) -> bool {
        if purpose == 0 || purpose as usize > PURPOSES_CONSENT_BITS {
            return false;
        }

        let shift = PURPOSES_CONSENT_BITS as u32 - purpose;
        (self.purposes_consent >> shift) & 1 == 1
    }

    pub fn vendor_allowed(&self, vendor_id: u32) -> bool {
        if vendor_id == 0 {
            return false;
        }

        match &self.vendor_consents {
            VendorConsents::BitField(bits) => bits
                .get(vendor_id as usize - 1)
                .copied()
                .unwrap_or(false),
            VendorConsents::Ranges(ranges) => ranges
                .iter()
                .any(|(start, end)| (*start..=*end).contains(&vendor_id)),
        }
    }
}

fn invalid(reason: String) -> Error {
    Error::InvalidConsentString { reason }
}

/// Reads big-endian bit fields from a byte slice.
struct BitReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> BitReader<'a> {
        BitReader { bytes, position: 0 }
    }

    fn seek(&mut self, position: usize) {
        self.position = position;
    }

    fn read_bool(&mut self) -> Result<bool, Error> {
        let byte = self
            .bytes
            .get(self.position / 8)
            .ok_or_else(|| invalid(format!("unexpected end of data at bit {}", self.position)))?;
        let bit = (byte >> (7 - self.position % 8)) & 1;
        self.position += 1;

        Ok(bit == 1)
    }

    fn read_int(&mut self, width: usize) -> Result<u32, Error> {
        let mut value = 0;
        for _ in 0..width {
            value = (value << 1) | self.read_bool()? as u32;
        }

        Ok(value)
    }
}
