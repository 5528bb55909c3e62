//! ADC conversions, executed on the device in a single frame.

use crate::codec::{decode_unsigned, BurstDirection, ByteOrder, CommandFrame};
use crate::consts::m328::{self, adc};
use crate::error::Result;
use crate::gpio::BitIndex;
use crate::session::DeviceSession;
use crate::transport::SerialTransport;
use log::{debug, trace};

impl<T: SerialTransport> DeviceSession<T> {
    /// Converts one ADC channel and returns the 10-bit result (0-1023).
    ///
    /// Channel select, conversion start, the wait for completion and the
    /// result read all go out as one frame. The wait runs on the device, so
    /// the host only blocks on the two reply bytes.
    pub fn read_analog(&mut self, channel: u8) -> Result<u16> {
        self.ensure_ready()?;
        self.pin_table().check_analog_channel(channel)?;
        let adsc = BitIndex::new(adc::ADSC_BIT)?;
        let frame = CommandFrame::new()
            .register_write(
                m328::ADMUX,
                adc::ADMUX_AVCC | (channel & adc::ADMUX_CHANNEL_MASK),
            )
            .register_write(m328::ADCSRA, adc::ADCSRA_START)
            .wait_until_cleared(adsc, m328::ADCSRA)
            .burst_read16(m328::ADCL, BurstDirection::Incrementing);
        let value = self.convert(&frame)?;
        debug!("analogRead channel {} = {}", channel, value);
        Ok(value)
    }

    /// Converts the channel currently selected in ADMUX.
    ///
    /// The ADC must already be configured, e.g. by an earlier `read_analog`
    /// or a direct ADMUX write.
    pub fn read_adc(&mut self) -> Result<u16> {
        self.ensure_ready()?;
        let adsc = BitIndex::new(adc::ADSC_BIT)?;
        let frame = CommandFrame::new()
            .set_bit(adsc, m328::ADCSRA)
            .wait_until_cleared(adsc, m328::ADCSRA)
            .burst_read16(m328::ADCL, BurstDirection::Incrementing);
        let value = self.convert(&frame)?;
        debug!("readADC = {}", value);
        Ok(value)
    }

    fn convert(&mut self, frame: &CommandFrame) -> Result<u16> {
        let reply = self.execute(frame)?;
        // ADCL then ADCH
        let raw = decode_unsigned(&reply, ByteOrder::LittleEndian)? as u16;
        trace!("ADC raw 0x{:04X}", raw);
        Ok(raw & adc::RESULT_MASK)
    }
}
