//! NXP MFRC522 13.56 MHz proximity reader driver (ISO 14443A).
//!
//! Generic over [`embedded_hal::spi::SpiDevice`], so the same code runs
//! on the ESP-IDF SPI master and against a scripted fake chip in tests.
//!
//! Per poll:
//!
//! ```text
//!   REQA (7-bit) ──no answer──▶ Ok(None)
//!       │ATQA
//!   ANTICOLL CL1 → SELECT CL1 ──SAK.cascade──▶ CL2 ──▶ CL3
//!       │
//!   Ok(Some(uid))   4, 7 or 10 bytes
//! ```
//!
//! Acknowledge sends HLTA (so the card stays quiet until it leaves the
//! field) and drops the Crypto1 session bit.  CRC_A for SELECT and HLTA
//! frames is computed in software.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;
use log::{debug, info};

use crate::access::credential::Uid;
use crate::app::ports::CredentialReader;
use crate::error::ReaderError;

// ── Registers ─────────────────────────────────────────────────

mod reg {
    pub const COMMAND: u8 = 0x01;
    pub const COM_IRQ: u8 = 0x04;
    pub const ERROR: u8 = 0x06;
    pub const STATUS2: u8 = 0x08;
    pub const FIFO_DATA: u8 = 0x09;
    pub const FIFO_LEVEL: u8 = 0x0A;
    pub const BIT_FRAMING: u8 = 0x0D;
    pub const COLL: u8 = 0x0E;
    pub const MODE: u8 = 0x11;
    pub const TX_MODE: u8 = 0x12;
    pub const RX_MODE: u8 = 0x13;
    pub const TX_CONTROL: u8 = 0x14;
    pub const TX_ASK: u8 = 0x15;
    pub const MOD_WIDTH: u8 = 0x24;
    pub const T_MODE: u8 = 0x2A;
    pub const T_PRESCALER: u8 = 0x2B;
    pub const T_RELOAD_H: u8 = 0x2C;
    pub const T_RELOAD_L: u8 = 0x2D;
    pub const VERSION: u8 = 0x37;
}

mod cmd {
    pub const IDLE: u8 = 0x00;
    pub const TRANSCEIVE: u8 = 0x0C;
    pub const SOFT_RESET: u8 = 0x0F;
}

mod picc {
    pub const REQA: u8 = 0x26;
    pub const SEL_CL1: u8 = 0x93;
    pub const SEL_CL2: u8 = 0x95;
    pub const SEL_CL3: u8 = 0x97;
    pub const HLTA: u8 = 0x50;
    /// Cascade tag: the UID continues at the next level.
    pub const CT: u8 = 0x88;
}

const IRQ_TIMER: u8 = 0x01;
const IRQ_RX_IDLE: u8 = 0x30;
/// BufferOvfl | ParityErr | ProtocolErr.
const ERR_FATAL: u8 = 0x13;
const ERR_COLL: u8 = 0x08;
/// Status2Reg.MFCrypto1On
const STATUS2_CRYPTO1: u8 = 0x08;
/// SAK bit: UID not complete, go to next cascade level.
const SAK_CASCADE: u8 = 0x04;

/// Polls of ComIrqReg before giving up; the chip's own 25 ms timer
/// normally fires first.
const IRQ_POLL_LIMIT: u32 = 2_000;

/// Transceive buffer size (SELECT frame: 2 + 4 + BCC + CRC).
const FRAME_CAP: usize = 9;
type Frame = heapless::Vec<u8, FRAME_CAP>;

// ── Checksums ─────────────────────────────────────────────────

/// ISO 14443-3 CRC_A (poly 0x8408 reflected, preset 0x6363), LSB first.
pub fn crc_a(data: &[u8]) -> [u8; 2] {
    let mut crc: u16 = 0x6363;
    for &b in data {
        let mut ch = b ^ (crc as u8);
        ch ^= ch << 4;
        let ch = ch as u16;
        crc = (crc >> 8) ^ (ch << 8) ^ (ch << 3) ^ (ch >> 4);
    }
    [crc as u8, (crc >> 8) as u8]
}

/// Block check character: XOR of the four UID bytes of one cascade level.
pub fn bcc(uid_part: &[u8]) -> u8 {
    uid_part.iter().fold(0, |acc, b| acc ^ b)
}

// ── Driver ────────────────────────────────────────────────────

pub struct Mfrc522<SPI> {
    spi: SPI,
    version: u8,
}

impl<SPI: SpiDevice> Mfrc522<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi, version: 0 }
    }

    /// Soft-reset the chip, configure the receive timeout and turn the
    /// antenna on.
    ///
    /// Fails with [`ReaderError::NotDetected`] when the version register
    /// reads as a floating bus.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), ReaderError> {
        self.write_reg(reg::COMMAND, cmd::SOFT_RESET)?;
        delay.delay_ms(50);
        // PowerDown bit clears once the oscillator is up.
        let mut tries = 0;
        while self.read_reg(reg::COMMAND)? & 0x10 != 0 {
            tries += 1;
            if tries > 10 {
                return Err(ReaderError::Timeout);
            }
            delay.delay_ms(5);
        }

        self.write_reg(reg::TX_MODE, 0x00)?;
        self.write_reg(reg::RX_MODE, 0x00)?;
        self.write_reg(reg::MOD_WIDTH, 0x26)?;

        // TAuto, prescaler 0x0A9 → 40 kHz tick; reload 1000 → 25 ms timeout.
        self.write_reg(reg::T_MODE, 0x80)?;
        self.write_reg(reg::T_PRESCALER, 0xA9)?;
        self.write_reg(reg::T_RELOAD_H, 0x03)?;
        self.write_reg(reg::T_RELOAD_L, 0xE8)?;

        self.write_reg(reg::TX_ASK, 0x40)?; // 100 % ASK
        self.write_reg(reg::MODE, 0x3D)?; // CRC preset 0x6363

        let tx = self.read_reg(reg::TX_CONTROL)?;
        if tx & 0x03 != 0x03 {
            self.write_reg(reg::TX_CONTROL, tx | 0x03)?;
        }

        self.version = self.read_reg(reg::VERSION)?;
        if matches!(self.version, 0x00 | 0xFF) {
            return Err(ReaderError::NotDetected(self.version));
        }
        info!("MFRC522: version 0x{:02X}, antenna on", self.version);
        Ok(())
    }

    /// Chip version read during [`init`](Self::init).
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Release the SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }

    // ── ISO 14443A ────────────────────────────────────────────

    /// REQA: `true` if an idle card answered.
    fn request(&mut self) -> Result<bool, ReaderError> {
        // ValuesAfterColl: clear received bits after a collision.
        let coll = self.read_reg(reg::COLL)?;
        self.write_reg(reg::COLL, coll & !0x80)?;

        match self.transceive(&[picc::REQA], 7) {
            Ok(atqa) if atqa.len() == 2 => Ok(true),
            Ok(_) => Err(ReaderError::Protocol(0)),
            Err(ReaderError::Timeout) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Anticollision + SELECT through up to three cascade levels.
    fn select(&mut self) -> Result<Uid, ReaderError> {
        let mut uid = Uid::new();
        for sel in [picc::SEL_CL1, picc::SEL_CL2, picc::SEL_CL3] {
            let resp = self.transceive(&[sel, 0x20], 0)?;
            if resp.len() != 5 {
                return Err(ReaderError::Protocol(0));
            }
            if bcc(&resp[..4]) != resp[4] {
                return Err(ReaderError::BccMismatch);
            }

            let mut frame = Frame::new();
            // Capacity is 9: 2 + 5 + 2.
            let _ = frame.extend_from_slice(&[sel, 0x70]);
            let _ = frame.extend_from_slice(&resp);
            let crc = crc_a(&frame);
            let _ = frame.extend_from_slice(&crc);
            let sak = self.transceive(&frame, 0)?;
            let Some(&sak) = sak.first() else {
                return Err(ReaderError::Protocol(0));
            };

            let part = if resp[0] == picc::CT { &resp[1..4] } else { &resp[..4] };
            uid.extend_from_slice(part).map_err(|_| ReaderError::Protocol(0))?;

            if sak & SAK_CASCADE == 0 {
                return Ok(uid);
            }
        }
        Err(ReaderError::Protocol(0))
    }

    fn halt(&mut self) -> Result<(), ReaderError> {
        let mut frame = [picc::HLTA, 0x00, 0, 0];
        let crc = crc_a(&frame[..2]);
        frame[2..].copy_from_slice(&crc);
        // A halted card does not answer; silence is success.
        match self.transceive(&frame, 0) {
            Ok(_) | Err(ReaderError::Timeout) | Err(ReaderError::Protocol(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn stop_crypto1(&mut self) -> Result<(), ReaderError> {
        let s = self.read_reg(reg::STATUS2)?;
        self.write_reg(reg::STATUS2, s & !STATUS2_CRYPTO1)
    }

    /// Send `data` and collect the card's answer.
    ///
    /// `tx_last_bits` is the number of valid bits in the final byte
    /// (0 = all 8).
    fn transceive(&mut self, data: &[u8], tx_last_bits: u8) -> Result<Frame, ReaderError> {
        self.write_reg(reg::COMMAND, cmd::IDLE)?;
        self.write_reg(reg::COM_IRQ, 0x7F)?;
        self.write_reg(reg::FIFO_LEVEL, 0x80)?;
        for &b in data {
            self.write_reg(reg::FIFO_DATA, b)?;
        }
        self.write_reg(reg::COMMAND, cmd::TRANSCEIVE)?;
        self.write_reg(reg::BIT_FRAMING, 0x80 | (tx_last_bits & 0x07))?;

        let mut polls = 0;
        loop {
            let irq = self.read_reg(reg::COM_IRQ)?;
            if irq & IRQ_RX_IDLE != 0 {
                break;
            }
            if irq & IRQ_TIMER != 0 {
                return Err(ReaderError::Timeout);
            }
            polls += 1;
            if polls >= IRQ_POLL_LIMIT {
                return Err(ReaderError::Timeout);
            }
        }

        let err = self.read_reg(reg::ERROR)?;
        if err & (ERR_FATAL | ERR_COLL) != 0 {
            return Err(ReaderError::Protocol(err));
        }

        let n = self.read_reg(reg::FIFO_LEVEL)? as usize;
        let mut out = Frame::new();
        for _ in 0..n.min(FRAME_CAP) {
            let b = self.read_reg(reg::FIFO_DATA)?;
            let _ = out.push(b);
        }
        Ok(out)
    }

    // ── Register access ───────────────────────────────────────

    fn read_reg(&mut self, addr: u8) -> Result<u8, ReaderError> {
        let mut buf = [0x80 | ((addr << 1) & 0x7E), 0];
        self.spi
            .transfer_in_place(&mut buf)
            .map_err(|_| ReaderError::Bus)?;
        Ok(buf[1])
    }

    fn write_reg(&mut self, addr: u8, value: u8) -> Result<(), ReaderError> {
        self.spi
            .write(&[(addr << 1) & 0x7E, value])
            .map_err(|_| ReaderError::Bus)
    }
}

impl<SPI: SpiDevice> CredentialReader for Mfrc522<SPI> {
    fn poll(&mut self) -> Result<Option<Uid>, ReaderError> {
        if !self.request()? {
            return Ok(None);
        }
        let uid = self.select()?;
        debug!("MFRC522: selected {}-byte UID", uid.len());
        Ok(Some(uid))
    }

    fn acknowledge(&mut self) -> Result<(), ReaderError> {
        self.halt()?;
        self.stop_crypto1()
    }
}
