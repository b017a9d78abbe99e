use serialport::SerialPort;
use std::io::{self, Read};
use std::time::Duration;

const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Open the RFID reader's serial port at 8N1. Some USB serial adapters need
/// the explicit framing settings.
pub fn open_port(port_name: &str, baud_rate: u32) -> Result<Box<dyn SerialPort>, serialport::Error> {
    serialport::new(port_name, baud_rate)
        .timeout(READ_TIMEOUT)
        .data_bits(serialport::DataBits::Eight)
        .stop_bits(serialport::StopBits::One)
        .parity(serialport::Parity::None)
        .open()
}

/// Drain everything the reader has buffered as one raw read. `None` means
/// the device is idle this cycle.
pub fn read_available(port: &mut Box<dyn SerialPort>) -> io::Result<Option<Vec<u8>>> {
    let available = port.bytes_to_read().map_err(io::Error::from)?;
    if available == 0 {
        return Ok(None);
    }
    let mut buf = vec![0u8; available as usize];
    port.read_exact(&mut buf)?;
    Ok(Some(buf))
}
